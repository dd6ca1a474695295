use clap::Parser;
use dcim_simulator::{validate, Simulator, TelemetryState};
use std::io::Write;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Runs the telemetry simulator without a server and prints one JSON
/// snapshot per tick to stdout.
#[derive(Debug, Parser)]
#[command(name = "dcim-simulator")]
struct Args {
    /// Number of ticks to run (0 runs until interrupted)
    #[arg(long, env = "TICKS", default_value_t = 0)]
    ticks: u64,

    /// Milliseconds between ticks (0 runs as fast as possible)
    #[arg(long, env = "TICK_INTERVAL_MS", default_value_t = 1000)]
    interval_ms: u64,

    /// Seed for reproducible runs
    #[arg(long, env = "SIM_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Logs go to stderr so stdout stays a clean JSON stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting headless simulator: ticks={}, interval={}ms, seed={:?}",
        args.ticks, args.interval_ms, args.seed
    );

    let mut state = TelemetryState::initial();
    let tick_secs = args.interval_ms.max(1) as f64 / 1000.0;
    let mut simulator = match args.seed {
        Some(seed) => Simulator::seeded(&state, tick_secs, seed),
        None => Simulator::new(&state, tick_secs),
    };

    let stdout = std::io::stdout();
    let mut counter = 0u64;

    loop {
        if args.ticks > 0 && counter >= args.ticks {
            break;
        }

        simulator.advance(&mut state);
        counter += 1;

        if let Err(e) = validate(&state) {
            warn!("Tick {} produced an invalid snapshot: {}", counter, e);
        }

        let line = match serde_json::to_string(&state) {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to serialize snapshot: {}", e);
                continue;
            }
        };

        if let Err(e) = writeln!(stdout.lock(), "{}", line) {
            // Downstream pipe closed
            warn!("Stopping, stdout unavailable: {}", e);
            break;
        }

        if counter % 60 == 0 {
            info!("Simulated {} ticks", counter);
        }

        if args.interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
        }
    }

    info!("Simulator stopped after {} ticks", counter);
}
