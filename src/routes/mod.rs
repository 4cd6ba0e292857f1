mod groups;

use std::any::Any;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use clinica_core::{
    controller::Controller,
    response::{ErrorBody, not_found},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    normalize_path::{NormalizePath, NormalizePathLayer},
    trace::TraceLayer,
};
use tower::Layer;

use crate::app::{AppState, controller::SystemController};

pub use groups::{RouteGroup, RouteGroups};

/// JSON request bodies above this size are rejected.
pub const JSON_BODY_LIMIT: usize = 100 * 1024;

/// The served service: the router behind trailing-slash trimming.
pub type Gateway = NormalizePath<Router>;

/// Build the complete gateway router.
///
/// `/api/ping/` and `/api/ping` are the same route. Trimming has to wrap the
/// router from outside, a `Router::layer` would run after routing.
pub fn routes(state: AppState, groups: RouteGroups) -> Gateway {
    let mut router = Router::new().nest("/api", SystemController::router());

    for (group, group_router) in groups.build(&state) {
        router = router.nest(group.prefix(), group_router);
    }

    let router = router
        .method_not_allowed_fallback(not_found)
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors())
        .layer(TraceLayer::new_for_http());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Every origin is allowed.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AnyOrigin)
}

/// A panicking handler answers 500; the panic itself is logged by the process hook.
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(ErrorBody::internal())).into_response()
}
