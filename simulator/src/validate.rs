use crate::errors::{Error, Result};
use crate::history::HISTORY_LEN;
use crate::telemetry::TelemetryState;
use crate::tick::{COLD_AISLE_HUM, COLD_AISLE_TEMP, OUTDOOR_TEMP};
use crate::walk::{is_rounded, SoftClamp};

/// Checks the invariants every published snapshot must hold: full history
/// window, display rounding and the soft-clamped ranges.
pub fn validate(state: &TelemetryState) -> Result<()> {
    let history = &state.env_data.history;
    if history.len() != HISTORY_LEN {
        return Err(Error::HistoryLength {
            expected: HISTORY_LEN,
            actual: history.len(),
        });
    }

    let ups = &state.ups_data;
    let env = &state.env_data;
    let one_decimal = [
        ("upsData.inputVoltage", ups.input_voltage),
        ("upsData.outputVoltage", ups.output_voltage),
        ("upsData.batteryVoltage", ups.battery_voltage),
        ("coolingData.supplyTemp", state.cooling_data.supply_temp),
        ("coolingData.returnTemp", state.cooling_data.return_temp),
        ("envData.coldAisleTemp", env.cold_aisle_temp),
        ("envData.hotAisleTemp", env.hot_aisle_temp),
        ("envData.outdoorTemp", env.outdoor_temp),
        ("pduData.pdu1.voltage", state.pdu_data.pdu1.voltage),
        ("pduData.pdu2.voltage", state.pdu_data.pdu2.voltage),
    ];
    for (field, value) in one_decimal {
        check_rounded(field, value, 1)?;
    }

    check_rounded("pduData.pdu1.current", state.pdu_data.pdu1.current, 2)?;
    check_rounded("pduData.pdu2.current", state.pdu_data.pdu2.current, 2)?;

    for sample in history.iter() {
        check_rounded("envData.history.temp", sample.temp, 1)?;
        check_rounded("envData.history.hum", sample.hum, 0)?;
    }

    check_range("envData.outdoorTemp", env.outdoor_temp, &OUTDOOR_TEMP)?;
    check_range("envData.coldAisleTemp", env.cold_aisle_temp, &COLD_AISLE_TEMP)?;
    check_range("envData.coldAisleHum", env.cold_aisle_hum as f64, &COLD_AISLE_HUM)?;

    Ok(())
}

fn check_rounded(field: &'static str, value: f64, decimals: i32) -> Result<()> {
    if !is_rounded(value, decimals) {
        return Err(Error::Unrounded {
            field,
            value,
            decimals,
        });
    }
    Ok(())
}

fn check_range(field: &'static str, value: f64, clamp: &SoftClamp) -> Result<()> {
    if value < clamp.lower || value > clamp.upper {
        return Err(Error::OutOfRange {
            field,
            value,
            min: clamp.lower,
            max: clamp.upper,
        });
    }
    Ok(())
}
