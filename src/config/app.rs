use std::fmt;
use std::time::Duration;

use clinica_core::config::ConfigBuilder;

pub const DEFAULT_APP_PORT: u16 = 5000;
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 5;

#[derive(Clone)]
pub struct AppConfig {
    pub app_port: u16,
    pub database: DatabaseConfig,
    pub mail: MailConfig,
}

#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub ssl: bool,
    /// Upper bound for opening a connection or waiting for one from the pool.
    pub timeout: Duration,
}

/// Mail settings are only carried through to the route groups that send mail.
#[derive(Clone, PartialEq, Eq)]
pub struct MailConfig {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl ConfigBuilder for AppConfig {
    fn build() -> anyhow::Result<Self> {
        Ok(AppConfig::from_lookup(|key| std::env::var(key).ok()))
    }
}

impl AppConfig {
    /// Build the config from any key/value source. Missing keys are never fatal.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let app_port = match var("APP_PORT") {
            None => DEFAULT_APP_PORT,
            Some(raw) => raw.trim().parse().unwrap_or_else(|err| {
                tracing::error!("cannot parse `APP_PORT` ({raw:?}). defaulting to {DEFAULT_APP_PORT} {:?}", err);
                DEFAULT_APP_PORT
            }),
        };

        let database = DatabaseConfig {
            host: var("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.into()),
            port: parse_port("DB_PORT", var("DB_PORT")).unwrap_or(DEFAULT_DB_PORT),
            name: var("DB_NAME"),
            user: var("DB_USER"),
            password: lookup("DB_PASSWORD"),
            ssl: var("DB_SSL").is_some_and(|raw| is_truthy(&raw)),
            timeout: Duration::from_secs(
                parse_secs("DB_TIMEOUT_SECS", var("DB_TIMEOUT_SECS")).unwrap_or(DEFAULT_DB_TIMEOUT_SECS),
            ),
        };

        let mail = MailConfig {
            enabled: var("MAIL_ENABLED").is_some_and(|raw| is_truthy(&raw)),
            host: var("MAIL_HOST"),
            port: parse_port("MAIL_PORT", var("MAIL_PORT")),
            user: var("MAIL_USER"),
            pass: lookup("MAIL_PASS"),
        };

        AppConfig {
            app_port,
            database,
            mail,
        }
    }

    /// Secret values that must never reach a log line or a response body.
    pub fn secrets(&self) -> Vec<&str> {
        [
            self.database.password.as_deref(),
            self.mail.pass.as_deref(),
            self.mail.user.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|secret| !secret.is_empty())
        .collect()
    }
}

impl DatabaseConfig {
    /// Connection URL for the postgres driver, credentials percent-encoded.
    pub fn url(&self) -> anyhow::Result<String> {
        let mut url = url::Url::parse("postgres://localhost")?;

        url.set_host(Some(&self.host))
            .map_err(|err| anyhow::anyhow!("invalid `DB_HOST` {:?}: {err}", self.host))?;
        url.set_port(Some(self.port))
            .map_err(|_| anyhow::anyhow!("cannot set `DB_PORT` on database url"))?;

        if let Some(user) = &self.user {
            url.set_username(user)
                .map_err(|_| anyhow::anyhow!("cannot set `DB_USER` on database url"))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| anyhow::anyhow!("cannot set `DB_PASSWORD` on database url"))?;
        }
        if let Some(name) = &self.name {
            url.set_path(name);
        }

        let mode = if self.ssl { "require" } else { "disable" };
        url.query_pairs_mut().append_pair("sslmode", mode);

        Ok(url.into())
    }
}

fn parse_port(key: &str, raw: Option<String>) -> Option<u16> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(port) => Some(port),
        Err(err) => {
            tracing::warn!("cannot parse `{key}` ({raw:?}), ignoring it: {err}");
            None
        }
    }
}

fn parse_secs(key: &str, raw: Option<String>) -> Option<u64> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(0) => {
            tracing::warn!("`{key}` must be positive, ignoring it");
            None
        }
        Ok(secs) => Some(secs),
        Err(err) => {
            tracing::warn!("cannot parse `{key}` ({raw:?}), ignoring it: {err}");
            None
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "require"
    )
}

fn mask(value: &Option<String>) -> Option<&'static str> {
    value.as_ref().map(|_| clinica_core::config::REDACTED)
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_port", &self.app_port)
            .field("database", &self.database)
            .field("mail", &self.mail)
            .finish()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &mask(&self.password))
            .field("ssl", &self.ssl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &mask(&self.user))
            .field("pass", &mask(&self.pass))
            .finish()
    }
}
