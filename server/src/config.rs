use crate::errors::{Error, Result};
use clap::Parser;
use std::time::Duration;

/// Dashboard backend settings. Every flag can also be set through the
/// environment variable named next to it.
#[derive(Debug, Clone, Parser)]
#[command(name = "dcim-server", about = "Live data-center telemetry broadcaster")]
pub struct Config {
    /// Address to bind the HTTP/WebSocket listener to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Milliseconds between simulation ticks
    #[arg(long, env = "TICK_INTERVAL_MS", default_value_t = 1000)]
    pub tick_interval_ms: u64,

    /// Frames buffered per viewer before ticks are dropped for it
    #[arg(long, env = "VIEWER_QUEUE", default_value_t = 16)]
    pub viewer_queue: usize,

    /// Seed for the random walks (reproducible runs)
    #[arg(long, env = "SIM_SEED")]
    pub seed: Option<u64>,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::Config(
                "tick interval must be greater than zero".to_string(),
            ));
        }
        if self.viewer_queue == 0 {
            return Err(Error::Config(
                "viewer queue must hold at least one frame".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            viewer_queue: self.viewer_queue,
            seed: self.seed,
        }
    }
}

/// The subset of [`Config`] the telemetry engine needs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub tick_interval: Duration,
    pub viewer_queue: usize,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1000),
            viewer_queue: 16,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["dcim-server"]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override() {
        let config = Config::try_parse_from([
            "dcim-server",
            "--port",
            "8081",
            "--tick-interval-ms",
            "250",
            "--seed",
            "7",
        ])
        .unwrap();

        let engine = config.engine();
        assert_eq!(config.port, 8081);
        assert_eq!(engine.tick_interval, Duration::from_millis(250));
        assert_eq!(engine.seed, Some(7));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = Config::try_parse_from(["dcim-server", "--tick-interval-ms", "0"]).unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_queue_rejected() {
        let config = Config::try_parse_from(["dcim-server", "--viewer-queue", "0"]).unwrap();
        assert!(config.validate().is_err());
    }
}
