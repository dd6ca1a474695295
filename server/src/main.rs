use clap::Parser;
use dcim_server::{metrics, ticker, Config, TelemetryEngine};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("Starting DCIM telemetry server");
    info!(
        "Listen: {}, tick interval: {}ms, viewer queue: {}",
        config.bind_addr(),
        config.tick_interval_ms,
        config.viewer_queue
    );

    if let Err(e) = metrics::init_metrics() {
        error!("Failed to register metrics: {}", e);
        std::process::exit(1);
    }

    let engine_config = config.engine();
    let engine = Arc::new(TelemetryEngine::new(&engine_config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .unwrap_or_else(|e| {
            error!("Failed to bind to {}: {}", config.bind_addr(), e);
            std::process::exit(1);
        });

    info!("DCIM backend listening on {}", config.bind_addr());

    let mut ticker_handle = tokio::spawn(ticker::run_ticker(
        engine.clone(),
        engine_config.tick_interval,
    ));

    let server_engine = engine.clone();
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = dcim_server::serve(listener, server_engine).await {
            error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = &mut ticker_handle => {
            error!("Ticker task terminated");
        }
        _ = &mut server_handle => {
            error!("HTTP server terminated");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    ticker_handle.abort();
    engine.shutdown().await;
    server_handle.abort();

    info!("Shutting down");
}
