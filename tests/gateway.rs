use std::collections::BTreeMap;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    routing::get,
};
use clinica::{
    app::AppState,
    bootstrap,
    config::AppConfig,
    db,
    routes::{Gateway, RouteGroup, RouteGroups},
};
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, MockDatabase, RuntimeErr, Value};
use serde_json::{Value as Json, json};
use tower::ServiceExt;

fn config(pairs: &[(&str, &str)]) -> AppConfig {
    let env: BTreeMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    AppConfig::from_lookup(|key| env.get(key).cloned())
}

fn healthy_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([("ok", Value::Int(Some(1)))])]])
        .into_connection()
}

fn failing_db(message: &str) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([DbErr::Query(RuntimeErr::Internal(message.to_string()))])
        .into_connection()
}

fn idle_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn gateway(db: DatabaseConnection, groups: RouteGroups) -> Gateway {
    bootstrap::assemble(config(&[("DB_PASSWORD", "hunter2")]), db, groups).router
}

async fn send(router: Gateway, request: Request<Body>) -> (StatusCode, Option<Json>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, serde_json::from_slice(&bytes).ok())
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn ping_always_answers_ok() {
    let router = gateway(idle_db(), RouteGroups::new());

    let (status, body) = send(router.clone(), get_request("/api/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({ "ok": true })));

    let request = Request::builder()
        .uri("/api/ping")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-anything", "ignored")
        .body(Body::from(r#"{"ignored":true}"#))
        .unwrap();
    let (status, body) = send(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({ "ok": true })));
}

#[tokio::test]
async fn unknown_paths_are_uniform_404() {
    let router = gateway(idle_db(), RouteGroups::new());

    for uri in ["/api/unknown", "/", "/api", "/api/clinics/1", "/nope/deeper"] {
        let (status, body) = send(router.clone(), get_request(uri)).await;

        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, Some(json!({ "error": "Not found" })), "{uri}");
    }
}

#[tokio::test]
async fn wrong_method_on_known_path_is_404() {
    let router = gateway(idle_db(), RouteGroups::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ping")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(router, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Some(json!({ "error": "Not found" })));
}

#[tokio::test]
async fn health_reports_the_query_result() {
    let router = gateway(healthy_db(), RouteGroups::new());

    let (status, body) = send(router, get_request("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({ "ok": true, "db": 1 })));
}

#[tokio::test]
async fn health_reports_database_failures() {
    let router = gateway(failing_db("connection refused"), RouteGroups::new());

    let (status, body) = send(router, get_request("/api/health")).await;
    let body = body.unwrap();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["db"], json!("down"));
    assert!(body.get("code").is_none());
    assert!(body["message"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn health_failure_never_leaks_the_password() {
    let router = gateway(
        failing_db("password authentication failed (hunter2)"),
        RouteGroups::new(),
    );

    let (status, body) = send(router, get_request("/api/health")).await;
    let message = body.unwrap()["message"].as_str().unwrap().to_string();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!message.contains("hunter2"));
    assert!(message.contains("***"));
}

#[tokio::test]
async fn cors_preflight_from_any_origin_is_allowed() {
    let router = gateway(idle_db(), RouteGroups::new());
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/ping")
        .header(header::ORIGIN, "https://somewhere-else.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let headers = response.headers();

    assert!(response.status().is_success());
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn cross_origin_requests_get_allow_origin() {
    let router = gateway(idle_db(), RouteGroups::new());
    let request = Request::builder()
        .uri("/api/ping")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn mounted_groups_receive_their_prefix() {
    let groups = RouteGroups::new()
        .mount(RouteGroup::Clinics, |_| {
            Router::new().route("/", get(|| async { "clinics" }))
        })
        .mount(RouteGroup::VisitTypes, |_| {
            Router::new().route("/{id}", get(|| async { "visit type" }))
        });
    let router = gateway(idle_db(), groups);

    let response = router.clone().oneshot(get_request("/api/clinics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"clinics");

    let response = router.clone().oneshot(get_request("/api/visit-types/7")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(router, get_request("/api/clinics/unknown/path")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Some(json!({ "error": "Not found" })));
}

#[tokio::test]
async fn groups_are_built_with_the_loaded_config() {
    let groups = RouteGroups::new().mount(RouteGroup::Catalog, |state: &AppState| {
        let port = state.config.app_port;
        Router::new().route("/port", get(move || async move { port.to_string() }))
    });
    let app = bootstrap::assemble(config(&[("APP_PORT", "6100")]), idle_db(), groups);

    assert_eq!(app.config.app_port, 6100);

    let response = app.router.oneshot(get_request("/api/catalog/port")).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"6100");
}

#[tokio::test]
async fn default_port_is_5000() {
    let app = bootstrap::assemble(config(&[]), idle_db(), RouteGroups::new());

    assert_eq!(app.config.app_port, 5000);
}

#[tokio::test]
async fn panicking_handler_does_not_stop_the_server() {
    let groups = RouteGroups::new().mount(RouteGroup::Slots, |_| {
        Router::new().route(
            "/explode",
            get(|| async {
                if true {
                    panic!("slot handler blew up");
                }
                "unreachable"
            }),
        )
    });
    let router = gateway(idle_db(), groups);

    let (status, body) = send(router.clone(), get_request("/api/slots/explode")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, Some(json!({ "error": "Internal server error" })));

    let (status, body) = send(router, get_request("/api/ping")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({ "ok": true })));
}

#[tokio::test]
async fn oversized_json_bodies_are_rejected() {
    let groups = RouteGroups::new().mount(RouteGroup::Appointments, |_| {
        Router::new().route(
            "/",
            axum::routing::post(|axum::Json(body): axum::Json<Json>| async move {
                axum::Json(body)
            }),
        )
    });
    let router = gateway(idle_db(), groups);

    let payload = json!({ "note": "x".repeat(clinica::routes::JSON_BODY_LIMIT + 1) }).to_string();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/appointments")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn trailing_slash_reaches_the_same_route() {
    let groups = RouteGroups::new().mount(RouteGroup::Clinics, |_| {
        Router::new().route("/", get(|| async { "clinics" }))
    });
    let router = gateway(idle_db(), groups);

    let (status, body) = send(router.clone(), get_request("/api/ping/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({ "ok": true })));

    let response = router.clone().oneshot(get_request("/api/clinics/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"clinics");

    let (status, body) = send(router, get_request("/api/unknown/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Some(json!({ "error": "Not found" })));
}

#[tokio::test]
async fn health_on_a_refused_database_answers_quickly_with_a_code() {
    let config = config(&[
        ("DB_HOST", "127.0.0.1"),
        ("DB_PORT", "1"),
        ("DB_NAME", "clinic"),
        ("DB_TIMEOUT_SECS", "1"),
    ]);
    let pool = db::connect(&config.database).await.unwrap();
    let router = bootstrap::assemble(config, pool, RouteGroups::new()).router;

    let started = std::time::Instant::now();
    let (status, body) = send(router, get_request("/api/health")).await;
    let body = body.unwrap();

    assert!(started.elapsed() < std::time::Duration::from_secs(10));
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["db"], json!("down"));
    assert!(body["code"].is_string(), "{body}");
    assert!(body["message"].is_string());
}
