use anyhow::Result;

/// Trait for building configuration structs
///
/// Implementors read from the process environment (or any other source)
/// and construct the configuration once during bootstrap. The result is then
/// handed to whatever needs it instead of being looked up globally.
pub trait ConfigBuilder: Clone + Send + Sync + 'static {
    /// Build the configuration instance
    fn build() -> Result<Self>;
}

/// Marker written in place of a secret value in diagnostics.
pub const REDACTED: &str = "***set***";

/// Mask a secret for logging: present values become [`REDACTED`], absent stay absent.
pub fn redact(value: Option<&str>) -> Option<String> {
    value.map(|_| REDACTED.to_string())
}

/// Replace every occurrence of the given secrets inside `message` with `***`.
///
/// Empty secrets are ignored, otherwise every character boundary would match.
pub fn scrub<S: AsRef<str>>(message: &str, secrets: &[S]) -> String {
    secrets
        .iter()
        .map(AsRef::as_ref)
        .filter(|secret| !secret.is_empty())
        .fold(message.to_string(), |acc, secret| acc.replace(secret, "***"))
}
