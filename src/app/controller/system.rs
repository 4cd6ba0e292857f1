use axum::{Json, extract::State};
use clinica_core::response::CoreResponse;
use clinica_macros::{controller, get, utoipa_response};

use crate::app::AppState;
use crate::app::response::{HealthDown, HealthResponse, HealthUp, PingResponse};
use crate::db;

/// Liveness and health endpoints owned by the gateway itself.
pub struct SystemController;

#[controller(state = AppState)]
impl SystemController {
    #[get("/ping")]
    #[utoipa_response(status = 200, body = PingResponse, description = "Process is up")]
    pub async fn ping() -> Json<PingResponse> {
        Json(PingResponse { ok: true })
    }

    #[get("/health")]
    #[utoipa_response(status = 200, body = HealthUp, description = "Database reachable")]
    #[utoipa_response(status = 500, body = HealthDown, description = "Database unreachable")]
    pub async fn health(State(state): State<AppState>) -> HealthResponse {
        match db::probe(&state.db).await {
            Ok(value) => CoreResponse::Ok(HealthUp::new(value)),
            Err(failure) => {
                let failure = failure.scrubbed(&state.config.secrets());
                tracing::warn!(code = ?failure.code, "health check failed: {}", failure.message);

                CoreResponse::InternalServerError(failure.into())
            }
        }
    }
}
