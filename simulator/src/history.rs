//! Fixed-capacity cold-aisle history.
//!
//! The buffer always holds exactly [`HISTORY_LEN`] samples, oldest first.
//! Pushing a sample evicts the oldest one, so the length never changes
//! after construction. Deserialization rejects any other length.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::walk::{round_to, round_whole};

/// Number of samples kept (one minute at the default tick rate).
pub const HISTORY_LEN: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub temp: f64,
    pub hum: f64,
}

impl HistorySample {
    /// Sample with display rounding applied: temperature to one decimal,
    /// humidity to a whole percent.
    pub fn rounded(temp: f64, hum: f64) -> Self {
        Self {
            temp: round_to(temp, 1),
            hum: round_whole(hum),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<HistorySample>", into = "Vec<HistorySample>")]
pub struct History {
    samples: VecDeque<HistorySample>,
}

impl History {
    /// Builds a history from an iterator, padding with the last sample (or
    /// truncating from the front) so the result is exactly full.
    pub fn from_samples(samples: impl IntoIterator<Item = HistorySample>) -> Self {
        let mut buf: VecDeque<HistorySample> = samples.into_iter().collect();
        while buf.len() > HISTORY_LEN {
            buf.pop_front();
        }
        let pad = buf.back().copied().unwrap_or(HistorySample {
            temp: 0.0,
            hum: 0.0,
        });
        while buf.len() < HISTORY_LEN {
            buf.push_back(pad);
        }
        Self { samples: buf }
    }

    /// Drops the oldest sample and appends `sample` at the end.
    pub fn rotate(&mut self, sample: HistorySample) {
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&HistorySample> {
        self.samples.front()
    }

    pub fn last(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }
}

impl TryFrom<Vec<HistorySample>> for History {
    type Error = String;

    fn try_from(samples: Vec<HistorySample>) -> Result<Self, Self::Error> {
        if samples.len() != HISTORY_LEN {
            return Err(format!(
                "history must hold {} samples, got {}",
                HISTORY_LEN,
                samples.len()
            ));
        }
        Ok(Self {
            samples: samples.into(),
        })
    }
}

impl From<History> for Vec<HistorySample> {
    fn from(history: History) -> Self {
        history.samples.into()
    }
}
