use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

/// Shared by every handler, including the mounted route groups.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        AppState {
            config: Arc::new(config),
            db,
        }
    }
}
