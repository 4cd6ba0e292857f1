mod env;
mod faults;
mod server;
mod tracing;

use std::path::Path;

use clinica_core::config::ConfigBuilder;
use sea_orm::DatabaseConnection;

use crate::app::AppState;
use crate::config::{AppConfig, ConfigSnapshot};
use crate::routes::{Gateway, RouteGroups};

pub use env::{EnvFile, default_env_file};
pub use server::init_server;

/// A fully wired gateway, ready to be served.
pub struct Application {
    pub config: std::sync::Arc<AppConfig>,
    pub router: Gateway,
}

/// Process-wide setup: env file, logging, panic hook. Runs once, first.
///
/// The env file is loaded before tracing so `RUST_LOG` may come from it.
pub async fn init_base(env_file: Option<&Path>) -> EnvFile {
    let env_file = env::init_env(env_file).await;
    tracing::init_tracing().await;
    faults::install_panic_hook();

    env_file.log();
    env_file
}

/// Config, database handle and router, in that order.
pub async fn init_app(groups: RouteGroups) -> anyhow::Result<Application> {
    let config = AppConfig::build()?;
    ConfigSnapshot::from_env().log();

    let db = crate::db::connect(&config.database).await?;

    Ok(assemble(config, db, groups))
}

/// Wire an already built config and database handle into a router.
pub fn assemble(config: AppConfig, db: DatabaseConnection, groups: RouteGroups) -> Application {
    let state = AppState::new(config, db);
    let config = state.config.clone();
    let router = crate::routes::routes(state, groups);

    Application { config, router }
}
