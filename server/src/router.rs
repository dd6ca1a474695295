use crate::engine::TelemetryEngine;
use crate::rest;
use crate::ws;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Full HTTP surface: `/ws` for viewers plus the REST and metrics routes.
/// Any origin is allowed so a dashboard served from another port can
/// connect.
pub fn build_router(engine: Arc<TelemetryEngine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(engine.clone())
        .merge(rest::create_router(engine))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
