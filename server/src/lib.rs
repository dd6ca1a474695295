//! Live facility-monitoring backend.
//!
//! A [`TelemetryEngine`] owns the simulated data-center state and advances
//! it once per tick; every tick is pushed to all connected viewers over
//! WebSocket (`/ws`), and a new viewer receives the current snapshot as
//! soon as it joins.

pub mod broadcast;
pub mod config;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod mirror;
pub mod model;
pub mod rest;
pub mod router;
pub mod session;
pub mod ticker;
pub mod ws;

pub use config::{Config, EngineConfig};
pub use engine::TelemetryEngine;
pub use errors::{Error, Result};
pub use mirror::ViewerMirror;
pub use router::build_router;

use std::sync::Arc;
use tokio::net::TcpListener;

/// Serves the full router on an already bound listener until the task is
/// cancelled or the listener fails.
pub async fn serve(listener: TcpListener, engine: Arc<TelemetryEngine>) -> Result<()> {
    let app = build_router(engine);
    axum::serve(listener, app).await?;
    Ok(())
}
