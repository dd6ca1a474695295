use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

use crate::history::HistorySample;
use crate::telemetry::TelemetryState;
use crate::walk::{round_to, round_whole, Drift, Resample, SoftClamp};

pub const INPUT_VOLTAGE: Resample = Resample::new(230.0, 1.0);
pub const OUTPUT_VOLTAGE: Resample = Resample::new(230.0, 0.2);
pub const SUPPLY_TEMP: Resample = Resample::new(18.5, 0.5);

pub const OUTDOOR_TEMP: SoftClamp = SoftClamp::new(0.1, 10.0, 30.0, 0.2);
pub const COLD_AISLE_TEMP: SoftClamp = SoftClamp::new(0.4, 21.0, 25.0, 0.2);
pub const COLD_AISLE_HUM: SoftClamp = SoftClamp::new(1.5, 40.0, 55.0, 0.8);

pub const PDU_VOLTAGE: Drift = Drift::new(0.2);
pub const PDU_CURRENT: Drift = Drift::new(0.1);

const SECONDS_PER_HOUR: f64 = 3600.0;
const WATTS_PER_KILOWATT: f64 = 1000.0;

/// Advances a [`TelemetryState`] one tick at a time.
///
/// Holds the walk state that is never published: the unrounded outdoor
/// temperature and cold-aisle sample the next steps walk from, and the raw
/// PDU energy counters. Walking from the rounded values would let rounding
/// swallow steps smaller than half a display digit.
#[derive(Debug)]
pub struct Simulator {
    rng: StdRng,
    tick_secs: f64,
    outdoor: f64,
    cold_aisle: HistorySample,
    pdu_energy: [f64; 2],
}

impl Simulator {
    pub fn new(state: &TelemetryState, tick_secs: f64) -> Self {
        Self::with_rng(state, tick_secs, StdRng::from_entropy())
    }

    pub fn seeded(state: &TelemetryState, tick_secs: f64, seed: u64) -> Self {
        Self::with_rng(state, tick_secs, StdRng::seed_from_u64(seed))
    }

    fn with_rng(state: &TelemetryState, tick_secs: f64, rng: StdRng) -> Self {
        let cold_aisle = state
            .env_data
            .history
            .last()
            .copied()
            .unwrap_or(HistorySample {
                temp: state.env_data.cold_aisle_temp,
                hum: state.env_data.cold_aisle_hum as f64,
            });
        Self {
            rng,
            tick_secs,
            outdoor: state.env_data.outdoor_temp,
            cold_aisle,
            pdu_energy: [state.pdu_data.pdu1.energy, state.pdu_data.pdu2.energy],
        }
    }

    /// Unrounded outdoor temperature the next walk step starts from.
    pub fn outdoor_raw(&self) -> f64 {
        self.outdoor
    }

    /// Unrounded cold-aisle sample the next walk step starts from.
    pub fn cold_aisle_raw(&self) -> HistorySample {
        self.cold_aisle
    }

    /// Applies one complete mutation to `state`.
    ///
    /// Every written value is already display-rounded; the caller never sees
    /// an intermediate.
    pub fn advance(&mut self, state: &mut TelemetryState) {
        let rng = &mut self.rng;

        let ups = &mut state.ups_data;
        ups.input_voltage = round_to(INPUT_VOLTAGE.sample(rng), 1);
        ups.output_voltage = round_to(OUTPUT_VOLTAGE.sample(rng), 1);

        state.cooling_data.supply_temp = round_to(SUPPLY_TEMP.sample(rng), 1);

        let env = &mut state.env_data;
        self.outdoor = OUTDOOR_TEMP.step(self.outdoor, rng);
        env.outdoor_temp = round_to(self.outdoor, 1);

        let walked = HistorySample {
            temp: COLD_AISLE_TEMP.step(self.cold_aisle.temp, rng),
            hum: COLD_AISLE_HUM.step(self.cold_aisle.hum, rng),
        };
        self.cold_aisle = walked;

        let published = HistorySample::rounded(walked.temp, walked.hum);
        env.cold_aisle_temp = published.temp;
        env.cold_aisle_hum = published.hum as i64;
        env.history.rotate(published);

        for (unit, energy) in state
            .pdu_data
            .units_mut()
            .into_iter()
            .zip(self.pdu_energy.iter_mut())
        {
            unit.voltage = round_to(PDU_VOLTAGE.step(unit.voltage, rng), 1);
            unit.current = round_to(PDU_CURRENT.step(unit.current, rng), 2);

            let watts = unit.voltage * unit.current * unit.power_factor;
            *energy += (watts.max(0.0) * self.tick_secs) / SECONDS_PER_HOUR / WATTS_PER_KILOWATT;
            unit.energy = round_to(*energy, 1);
        }

        trace!(
            cold_aisle_temp = env.cold_aisle_temp,
            cold_aisle_hum = env.cold_aisle_hum,
            outdoor_temp = env.outdoor_temp,
            "tick applied"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HISTORY_LEN;
    use crate::validate::validate;

    fn run(ticks: usize, seed: u64) -> (TelemetryState, Simulator) {
        let mut state = TelemetryState::initial();
        let mut sim = Simulator::seeded(&state, 1.0, seed);
        for _ in 0..ticks {
            sim.advance(&mut state);
        }
        (state, sim)
    }

    #[test]
    fn test_history_length_is_constant() {
        let mut state = TelemetryState::initial();
        let mut sim = Simulator::seeded(&state, 1.0, 3);
        for _ in 0..500 {
            assert_eq!(state.env_data.history.len(), HISTORY_LEN);
            sim.advance(&mut state);
            assert_eq!(state.env_data.history.len(), HISTORY_LEN);
        }
    }

    #[test]
    fn test_first_tick_input_voltage() {
        let (state, _) = run(1, 11);
        let v = state.ups_data.input_voltage;
        assert!((229.5..=230.99).contains(&v), "input voltage {}", v);
        assert_eq!(v, round_to(v, 1));
    }

    #[test]
    fn test_live_fields_match_newest_history() {
        let mut state = TelemetryState::initial();
        let mut sim = Simulator::seeded(&state, 1.0, 5);
        for _ in 0..100 {
            sim.advance(&mut state);
            let newest = state.env_data.history.last().copied().unwrap();
            assert_eq!(newest.temp, state.env_data.cold_aisle_temp);
            assert_eq!(newest.hum, state.env_data.cold_aisle_hum as f64);
        }
    }

    #[test]
    fn test_walk_continues_from_raw_sample() {
        let mut state = TelemetryState::initial();
        let mut sim = Simulator::seeded(&state, 1.0, 9);
        for _ in 0..200 {
            let before = sim.cold_aisle_raw();
            sim.advance(&mut state);
            let after = sim.cold_aisle_raw();
            // one jitter plus at most one correction step
            assert!((after.temp - before.temp).abs() <= 0.2 + 0.2 + 1e-9);
            assert!((after.hum - before.hum).abs() <= 0.75 + 0.8 + 1e-9);
        }
    }

    #[test]
    fn test_rotation_happens_every_tick() {
        let mut state = TelemetryState::initial();
        let mut sim = Simulator::seeded(&state, 1.0, 13);
        let mut produced = Vec::new();
        for _ in 0..61 {
            sim.advance(&mut state);
            produced.push(*state.env_data.history.last().unwrap());
        }

        // After 61 ticks the whole window is fresh: ticks 2..=61, oldest first.
        let window: Vec<HistorySample> = state.env_data.history.iter().copied().collect();
        assert_eq!(window, produced[1..]);
        assert_eq!(state.env_data.history.first(), Some(&produced[1]));
    }

    #[test]
    fn test_bounded_walks_over_long_run() {
        let mut state = TelemetryState::initial();
        let mut sim = Simulator::seeded(&state, 1.0, 21);
        for _ in 0..5_000 {
            sim.advance(&mut state);
            let env = &state.env_data;
            assert!((10.0..=30.0).contains(&env.outdoor_temp));
            assert!((21.0..=25.0).contains(&env.cold_aisle_temp));
            assert!((40..=55).contains(&env.cold_aisle_hum));
        }
    }

    #[test]
    fn test_outdoor_walk_moves_and_respects_upper_bound() {
        let mut state = TelemetryState::initial();
        state.env_data.outdoor_temp = 29.99;
        let mut sim = Simulator::seeded(&state, 1.0, 31);

        let mut seen = std::collections::BTreeSet::new();
        let mut corrected = 0;
        for _ in 0..20_000 {
            let before = sim.outdoor_raw();
            sim.advance(&mut state);
            let after = sim.outdoor_raw();
            if (after - before).abs() > 0.05 + 1e-9 {
                corrected += 1;
            }
            assert!((10.0..=30.0).contains(&after), "raw outdoor {}", after);
            assert!((10.0..=30.0).contains(&state.env_data.outdoor_temp));
            assert_eq!(state.env_data.outdoor_temp, round_to(after, 1));
            seen.insert((state.env_data.outdoor_temp * 10.0).round() as i64);
        }

        assert!(seen.len() > 1, "outdoor temperature never moved");
        assert!(corrected > 0, "correction step never applied");
    }

    #[test]
    fn test_outdoor_walk_respects_lower_bound() {
        let mut state = TelemetryState::initial();
        state.env_data.outdoor_temp = 10.1;
        let mut sim = Simulator::seeded(&state, 1.0, 32);
        for _ in 0..5_000 {
            sim.advance(&mut state);
            assert!((10.0..=30.0).contains(&sim.outdoor_raw()));
            assert!(state.env_data.outdoor_temp >= 10.0);
        }
    }

    #[test]
    fn test_every_tick_passes_validation() {
        let mut state = TelemetryState::initial();
        let mut sim = Simulator::seeded(&state, 1.0, 99);
        for _ in 0..1_000 {
            sim.advance(&mut state);
            validate(&state).unwrap();
        }
    }

    #[test]
    fn test_pdu_energy_is_monotonic() {
        let mut state = TelemetryState::initial();
        let mut sim = Simulator::seeded(&state, 1.0, 4);
        let mut last = (state.pdu_data.pdu1.energy, state.pdu_data.pdu2.energy);
        for _ in 0..3_600 {
            sim.advance(&mut state);
            let now = (state.pdu_data.pdu1.energy, state.pdu_data.pdu2.energy);
            assert!(now.0 >= last.0 && now.1 >= last.1);
            last = now;
        }
        // close to 2.8 kW for an hour, give or take current drift
        assert!(state.pdu_data.pdu1.energy > 1450.2 + 1.0);
    }

    #[test]
    fn test_static_fields_untouched() {
        let (state, _) = run(50, 8);
        let initial = TelemetryState::initial();
        assert_eq!(state.system, initial.system);
        assert_eq!(state.env_data.hot_aisle_temp, initial.env_data.hot_aisle_temp);
        assert_eq!(state.ups_data.ups_state, initial.ups_data.ups_state);
        assert_eq!(state.cooling_data.return_temp, initial.cooling_data.return_temp);
        assert_eq!(state.pdu_data.pdu1.frequency, 50.0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let (a, _) = run(30, 1234);
        let (b, _) = run(30, 1234);
        assert_eq!(a, b);
    }
}
