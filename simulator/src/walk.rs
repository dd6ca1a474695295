//! Perturbation rules used by the tick simulator.
//!
//! All perturbations are `(u - 0.5) * swing` for `u` uniform in `[0, 1)`,
//! i.e. a symmetric offset of at most `swing / 2`.

use rand::Rng;

/// Symmetric offset in `[-swing/2, swing/2)`.
pub fn jitter(rng: &mut impl Rng, swing: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * swing
}

/// Value resampled around a fixed center every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resample {
    pub center: f64,
    pub swing: f64,
}

impl Resample {
    pub const fn new(center: f64, swing: f64) -> Self {
        Self { center, swing }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        self.center + jitter(rng, self.swing)
    }
}

/// Random walk nudged back towards `[lower, upper]` by a fixed step.
///
/// Out-of-range values are moved by `correction` rather than clipped, so a
/// series near a bound oscillates instead of sticking to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoftClamp {
    pub swing: f64,
    pub lower: f64,
    pub upper: f64,
    pub correction: f64,
}

impl SoftClamp {
    pub const fn new(swing: f64, lower: f64, upper: f64, correction: f64) -> Self {
        Self {
            swing,
            lower,
            upper,
            correction,
        }
    }

    pub fn step(&self, current: f64, rng: &mut impl Rng) -> f64 {
        self.settle(current + jitter(rng, self.swing))
    }

    /// Applies the correction step to an already perturbed value.
    pub fn settle(&self, mut next: f64) -> f64 {
        if next > self.upper {
            next -= self.correction;
        }
        if next < self.lower {
            next += self.correction;
        }
        next
    }
}

/// Unbounded random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    pub swing: f64,
}

impl Drift {
    pub const fn new(swing: f64) -> Self {
        Self { swing }
    }

    pub fn step(&self, current: f64, rng: &mut impl Rng) -> f64 {
        current + jitter(rng, self.swing)
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn round_whole(value: f64) -> f64 {
    value.round()
}

/// True when `value` has at most `decimals` fractional digits.
pub fn is_rounded(value: f64, decimals: i32) -> bool {
    let scaled = value * 10f64.powi(decimals);
    (scaled - scaled.round()).abs() < 1e-6
}
