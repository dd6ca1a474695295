use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::history::{History, HistorySample, HISTORY_LEN};

/// Seed for the initial cold-aisle history so every process starts from
/// the same snapshot.
const HISTORY_SEED: u64 = 0x00DC_1A5E;

/// Complete facility snapshot pushed to dashboard viewers.
///
/// Field names serialize to the keys the dashboard reads
/// (`system`, `upsData`, `coolingData`, `envData`, `pduData`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryState {
    pub system: SystemInfo,
    pub ups_data: UpsData,
    pub cooling_data: CoolingData,
    pub env_data: EnvData,
    pub pdu_data: PduData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub connected: bool,
    pub status: SystemStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SystemStatus {
    Ok,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpsState {
    Mains,
    Battery,
}

/// Two-valued alarm contact (fire panel, leak rope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmStatus {
    Normal,
    Alarm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsData {
    pub input_voltage: f64,
    pub output_voltage: f64,
    pub ups_state: UpsState,
    pub battery_voltage: f64,
    pub charging_current: f64,
    pub discharging_current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoolingData {
    pub supply_temp: f64,
    pub return_temp: f64,
    pub compressor_status: bool,
    pub fan_status: bool,
    pub high_room_temp: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvData {
    pub cold_aisle_temp: f64,
    pub cold_aisle_hum: i64,
    pub hot_aisle_temp: f64,
    pub hot_aisle_hum: i64,
    pub fire_status: AlarmStatus,
    pub leakage_status: AlarmStatus,
    pub front_door_open: bool,
    pub back_door_open: bool,
    pub outdoor_temp: f64,
    pub history: History,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PduData {
    pub pdu1: PduReading,
    pub pdu2: PduReading,
}

impl PduData {
    pub fn units_mut(&mut self) -> [&mut PduReading; 2] {
        [&mut self.pdu1, &mut self.pdu2]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PduReading {
    pub voltage: f64,
    pub current: f64,
    pub frequency: f64,
    /// Accumulated energy in kWh.
    pub energy: f64,
    pub power_factor: f64,
}

impl TelemetryState {
    /// The fixed startup snapshot. A restart always begins here.
    pub fn initial() -> Self {
        Self {
            system: SystemInfo {
                connected: true,
                status: SystemStatus::Ok,
            },
            ups_data: UpsData {
                input_voltage: 230.5,
                output_voltage: 230.0,
                ups_state: UpsState::Mains,
                battery_voltage: 260.4,
                charging_current: 2.1,
                discharging_current: 0.0,
            },
            cooling_data: CoolingData {
                supply_temp: 18.5,
                return_temp: 24.2,
                compressor_status: true,
                fan_status: true,
                high_room_temp: false,
            },
            env_data: EnvData {
                cold_aisle_temp: 22.4,
                cold_aisle_hum: 48,
                hot_aisle_temp: 32.4,
                hot_aisle_hum: 30,
                fire_status: AlarmStatus::Normal,
                leakage_status: AlarmStatus::Normal,
                front_door_open: false,
                back_door_open: false,
                outdoor_temp: 18.2,
                history: seed_history(),
            },
            pdu_data: PduData {
                pdu1: PduReading {
                    voltage: 230.1,
                    current: 12.5,
                    frequency: 50.0,
                    energy: 1450.2,
                    power_factor: 0.98,
                },
                pdu2: PduReading {
                    voltage: 229.8,
                    current: 11.8,
                    frequency: 50.0,
                    energy: 1320.5,
                    power_factor: 0.97,
                },
            },
        }
    }
}

impl Default for TelemetryState {
    fn default() -> Self {
        Self::initial()
    }
}

fn seed_history() -> History {
    let mut rng = StdRng::seed_from_u64(HISTORY_SEED);
    let samples = (0..HISTORY_LEN).map(|_| {
        HistorySample::rounded(rng.gen_range(22.0..24.0), rng.gen_range(45.0..50.0))
    });
    History::from_samples(samples)
}
