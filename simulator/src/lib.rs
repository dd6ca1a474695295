//! Data-center telemetry model and tick simulator.
//!
//! [`TelemetryState`] is the complete facility snapshot; [`Simulator`]
//! advances it one tick at a time with bounded random walks.

pub mod errors;
pub mod history;
pub mod telemetry;
pub mod tick;
pub mod validate;
pub mod walk;

pub use errors::{Error, Result};
pub use history::{History, HistorySample, HISTORY_LEN};
pub use telemetry::{
    AlarmStatus, CoolingData, EnvData, PduData, PduReading, SystemInfo, SystemStatus,
    TelemetryState, UpsData, UpsState,
};
pub use tick::Simulator;
pub use validate::validate;
