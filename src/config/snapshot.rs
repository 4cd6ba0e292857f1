use std::fmt;

use clinica_core::config::redact;
use serde::Serialize;

/// Variables logged as-is.
const PLAIN_KEYS: [&str; 8] = [
    "DB_HOST",
    "DB_PORT",
    "DB_NAME",
    "DB_USER",
    "DB_SSL",
    "MAIL_ENABLED",
    "MAIL_HOST",
    "MAIL_PORT",
];

/// Variables only reported as present or absent.
const SECRET_KEYS: [&str; 2] = ["MAIL_USER", "MAIL_PASS"];

/// Redacted view of the environment, logged once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigSnapshot(Vec<(&'static str, Option<String>)>);

impl ConfigSnapshot {
    pub fn capture<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let plain = PLAIN_KEYS.iter().map(|key| (*key, lookup(key)));
        let secret = SECRET_KEYS
            .iter()
            .map(|key| (*key, redact(lookup(key).as_deref())));

        ConfigSnapshot(plain.chain(secret).collect())
    }

    pub fn from_env() -> Self {
        ConfigSnapshot::capture(|key| std::env::var(key).ok())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| *name == key)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn log(&self) {
        tracing::info!(env = %self, "[ENV]");
    }
}

impl fmt::Display for ConfigSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{key}: {value:?}")?,
                None => write!(f, "{key}: unset")?,
            }
        }
        f.write_str(" }")
    }
}
