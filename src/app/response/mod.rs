use clinica_core::response::{CoreResponse, ErrorBody};
use serde::{Deserialize, Serialize};

use crate::db::DbFailure;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PingResponse {
    pub ok: bool,
}

/// Database answered the liveness query.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthUp {
    pub ok: bool,
    /// `ok` column of the liveness query.
    #[schema(value_type = Object)]
    pub db: serde_json::Value,
}

/// Database could not be reached or the query failed.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthDown {
    pub ok: bool,
    pub db: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

impl HealthUp {
    pub fn new(db: serde_json::Value) -> Self {
        HealthUp { ok: true, db }
    }
}

impl From<DbFailure> for HealthDown {
    fn from(failure: DbFailure) -> Self {
        HealthDown {
            ok: false,
            db: "down".into(),
            code: failure.code,
            message: failure.message,
        }
    }
}

pub type HealthResponse = CoreResponse<HealthUp, ErrorBody, HealthDown>;
