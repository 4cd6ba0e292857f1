use std::borrow::Borrow;

use sea_orm::{
    ConnAcquireErr, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    FromQueryResult, JsonValue, RuntimeErr, Statement,
};

use crate::config::DatabaseConfig;

pub const HEALTH_QUERY: &str = "SELECT 1 AS ok";

/// Create the shared database handle.
///
/// The pool connects lazily so an unreachable database does not keep the
/// server from starting; it only shows up on `/api/health` and in route groups.
/// A refused connection fails after `config.timeout` instead of the driver's 30 s.
pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(config.url()?);
    options
        .connect_lazy(true)
        .connect_timeout(config.timeout)
        .acquire_timeout(config.timeout)
        .sqlx_logging(false);

    tracing::debug!(host = %config.host, port = config.port, "creating database pool");

    Database::connect(options)
        .await
        .map_err(|err| anyhow::anyhow!("cannot create database pool: {err}"))
}

/// A failed database call, reduced to what may be shown to a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DbFailure {
    pub code: Option<String>,
    pub message: String,
}

impl DbFailure {
    /// Drop every secret from the message.
    pub fn scrubbed<S: AsRef<str>>(self, secrets: &[S]) -> Self {
        DbFailure {
            code: self.code,
            message: clinica_core::config::scrub(&self.message, secrets),
        }
    }
}

impl From<DbErr> for DbFailure {
    fn from(err: DbErr) -> Self {
        let runtime = match &err {
            DbErr::Conn(runtime) | DbErr::Exec(runtime) | DbErr::Query(runtime) => Some(runtime),
            _ => None,
        };

        let (code, message) = match (&err, runtime) {
            (_, Some(RuntimeErr::SqlxError(sqlx_err))) => describe_sqlx(sqlx_err.borrow()),
            (DbErr::ConnectionAcquire(acquire), _) => {
                let code = match acquire {
                    ConnAcquireErr::Timeout => "PoolTimedOut",
                    _ => "PoolClosed",
                };
                (Some(code.into()), err.to_string())
            }
            _ => (None, err.to_string()),
        };

        DbFailure { code, message }
    }
}

fn describe_sqlx(err: &sea_orm::sqlx::Error) -> (Option<String>, String) {
    use sea_orm::sqlx::Error;

    match err {
        Error::Database(db_err) => (
            db_err.code().map(|code| code.into_owned()),
            db_err.message().to_string(),
        ),
        Error::Io(io_err) => (Some(format!("{:?}", io_err.kind())), io_err.to_string()),
        Error::PoolTimedOut => (Some("PoolTimedOut".into()), err.to_string()),
        Error::PoolClosed => (Some("PoolClosed".into()), err.to_string()),
        other => (None, other.to_string()),
    }
}

/// Run the liveness query and return the `ok` column of its first row.
pub async fn probe<C>(db: &C) -> Result<JsonValue, DbFailure>
where
    C: ConnectionTrait,
{
    let statement = Statement::from_string(db.get_database_backend(), HEALTH_QUERY);

    let row = JsonValue::find_by_statement(statement)
        .one(db)
        .await?
        .ok_or_else(|| DbFailure {
            code: None,
            message: "health query returned no rows".into(),
        })?;

    Ok(row.get("ok").cloned().unwrap_or(JsonValue::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_have_no_code() {
        let failure = DbFailure::from(DbErr::Query(RuntimeErr::Internal("boom".into())));

        assert_eq!(failure.code, None);
        assert!(failure.message.contains("boom"));
    }

    #[test]
    fn io_errors_report_their_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let (code, message) = describe_sqlx(&sea_orm::sqlx::Error::Io(io));

        assert_eq!(code.as_deref(), Some("ConnectionRefused"));
        assert_eq!(message, "connection refused");
    }

    #[test]
    fn pool_errors_carry_a_code() {
        let timeout = DbFailure::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert_eq!(timeout.code.as_deref(), Some("PoolTimedOut"));
        assert!(!timeout.message.is_empty());

        let closed = DbFailure::from(DbErr::ConnectionAcquire(ConnAcquireErr::ConnectionClosed));
        assert_eq!(closed.code.as_deref(), Some("PoolClosed"));
    }

    #[test]
    fn driver_errors_are_described_through_db_err() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let failure = DbFailure::from(DbErr::Conn(RuntimeErr::SqlxError(
            sea_orm::sqlx::Error::Io(io).into(),
        )));
        assert_eq!(failure.code.as_deref(), Some("ConnectionRefused"));
        assert_eq!(failure.message, "connection refused");

        let failure = DbFailure::from(DbErr::Query(RuntimeErr::SqlxError(
            sea_orm::sqlx::Error::PoolTimedOut.into(),
        )));
        assert_eq!(failure.code.as_deref(), Some("PoolTimedOut"));
    }

    #[tokio::test]
    async fn refused_database_fails_fast_with_a_code() {
        let config = DatabaseConfig {
            host: "127.0.0.1".into(),
            port: 1,
            name: Some("clinic".into()),
            user: Some("booking".into()),
            password: None,
            ssl: false,
            timeout: std::time::Duration::from_secs(1),
        };
        let db = connect(&config).await.unwrap();

        let started = std::time::Instant::now();
        let failure = probe(&db).await.unwrap_err();

        assert!(started.elapsed() < std::time::Duration::from_secs(10));
        assert!(failure.code.is_some(), "{failure:?}");
    }

    #[test]
    fn scrubbed_failure_drops_credentials() {
        let failure = DbFailure {
            code: Some("28P01".into()),
            message: "password authentication failed: hunter2".into(),
        }
        .scrubbed(&["hunter2"]);

        assert_eq!(failure.code.as_deref(), Some("28P01"));
        assert_eq!(failure.message, "password authentication failed: ***");
    }
}
