use crate::errors::Result;
use chrono::{DateTime, Utc};
use dcim_simulator::{AlarmStatus, TelemetryState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Event name carried by every snapshot frame.
pub const DASHBOARD_EVENT: &str = "dashboard:update";

/// Wire envelope around a telemetry snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub event: String,
    pub tick: u64,
    pub data: T,
}

/// Copy of the telemetry state taken at a tick boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub state: TelemetryState,
}

/// A serialized snapshot ready to send. Cloning shares the encoded text, so
/// every viewer of a tick receives the same bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    pub tick: u64,
    pub text: Arc<str>,
}

impl Frame {
    pub fn encode(tick: u64, state: &TelemetryState) -> Result<Self> {
        let envelope = Envelope {
            event: DASHBOARD_EVENT.to_string(),
            tick,
            data: state,
        };
        let text = serde_json::to_string(&envelope)?;
        Ok(Self {
            tick,
            text: text.into(),
        })
    }
}

/// Environment readings served by `GET /api/sensors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReadings {
    pub cold_aisle_temp: f64,
    pub cold_aisle_hum: i64,
    pub hot_aisle_temp: f64,
    pub hot_aisle_hum: i64,
    pub fire_status: AlarmStatus,
    pub leakage_status: AlarmStatus,
    pub front_door_open: bool,
    pub back_door_open: bool,
}

impl From<&TelemetryState> for SensorReadings {
    fn from(state: &TelemetryState) -> Self {
        let env = &state.env_data;
        Self {
            cold_aisle_temp: env.cold_aisle_temp,
            cold_aisle_hum: env.cold_aisle_hum,
            hot_aisle_temp: env.hot_aisle_temp,
            hot_aisle_hum: env.hot_aisle_hum,
            fire_status: env.fire_status,
            leakage_status: env.leakage_status,
            front_door_open: env.front_door_open,
            back_door_open: env.back_door_open,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub tick: u64,
    pub viewers: usize,
    pub started_at: DateTime<Utc>,
    pub uptime_secs: i64,
}
