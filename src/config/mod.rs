mod app;
mod snapshot;

pub use app::{AppConfig, DEFAULT_APP_PORT, DatabaseConfig, MailConfig};
pub use snapshot::ConfigSnapshot;
