use crate::engine::TelemetryEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

/// Drives the engine at a fixed period. The first tick fires one period
/// after start; missed ticks are delayed rather than bunched.
pub async fn run_ticker(engine: Arc<TelemetryEngine>, period: Duration) {
    info!("Starting ticker with period={:?}", period);

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Err(e) = engine.tick().await {
            error!("Tick failed: {}", e);
        }
    }
}
