#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use dropstock_api::config::ServerConfig;
use dropstock_api::router::build_app_router;
use dropstock_api::state::AppState;
use dropstock_api::ws::WsManager;
use dropstock_core::clock::{Clock, SystemClock};
use dropstock_events::EventBus;
use dropstock_inventory::InventoryConfig;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_max_connections: 5,
    }
}

/// Build the full application router on the wall clock.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_clock(pool, Arc::new(SystemClock))
}

/// Build the full application router with an injected clock, so tests can
/// move past hold deadlines without sleeping.
pub fn build_test_app_with_clock(pool: PgPool, clock: Arc<dyn Clock>) -> Router {
    let config = test_config();
    let state = AppState::new(
        pool,
        Arc::new(config.clone()),
        &InventoryConfig::default(),
        clock,
        Arc::new(WsManager::new()),
        Arc::new(EventBus::default()),
    );
    build_app_router(state, &config)
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body.
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
