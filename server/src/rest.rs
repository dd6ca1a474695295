use crate::engine::TelemetryEngine;
use crate::metrics;
use crate::model::{HealthResponse, SensorReadings};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::error;

pub fn create_router(engine: Arc<TelemetryEngine>) -> Router {
    Router::new()
        .route("/api/sensors", get(get_sensors))
        .route("/api/v1/snapshot", get(get_snapshot))
        .route("/api/v1/health", get(get_health))
        .route("/metrics", get(get_metrics))
        .with_state(engine)
}

async fn get_sensors(State(engine): State<Arc<TelemetryEngine>>) -> Json<SensorReadings> {
    let snapshot = engine.snapshot().await;
    Json(SensorReadings::from(&snapshot.state))
}

async fn get_snapshot(State(engine): State<Arc<TelemetryEngine>>) -> Result<Response, AppError> {
    let frame = engine.current_frame().await?;
    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        frame.text.to_string(),
    )
        .into_response())
}

async fn get_health(State(engine): State<Arc<TelemetryEngine>>) -> Json<HealthResponse> {
    let tick = engine.snapshot().await.tick;
    let started_at = engine.started_at();

    Json(HealthResponse {
        status: "ok".to_string(),
        tick,
        viewers: engine.viewer_count().await,
        started_at,
        uptime_secs: (Utc::now() - started_at).num_seconds(),
    })
}

async fn get_metrics() -> Result<String, AppError> {
    Ok(metrics::gather_metrics()?)
}

struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("API error: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal server error: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
