//! Client-side copy of the dashboard state.
//!
//! Mirrors what a dashboard does with the stream: keep the newest snapshot,
//! replace it wholesale on every frame and track whether the transport is
//! up. Gaps between frames are normal and not reported.

use crate::errors::Result;
use crate::model::{Envelope, DASHBOARD_EVENT};
use chrono::{DateTime, Utc};
use dcim_simulator::TelemetryState;

#[derive(Debug, Clone, Default)]
pub struct ViewerMirror {
    data: Option<TelemetryState>,
    tick: Option<u64>,
    connected: bool,
    last_updated: Option<DateTime<Utc>>,
}

impl ViewerMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror seeded with a placeholder state shown before the first frame.
    pub fn with_initial(state: TelemetryState) -> Self {
        Self {
            data: Some(state),
            ..Self::default()
        }
    }

    pub fn on_connect(&mut self) {
        self.connected = true;
    }

    pub fn on_disconnect(&mut self) {
        self.connected = false;
    }

    /// Applies one inbound text frame. Returns `Ok(false)` for events other
    /// than the dashboard snapshot, which are ignored.
    pub fn apply_text(&mut self, text: &str) -> Result<bool> {
        let envelope: Envelope<serde_json::Value> = serde_json::from_str(text)?;
        if envelope.event != DASHBOARD_EVENT {
            return Ok(false);
        }

        let state: TelemetryState = serde_json::from_value(envelope.data)?;
        self.data = Some(state);
        self.tick = Some(envelope.tick);
        self.last_updated = Some(Utc::now());
        Ok(true)
    }

    pub fn data(&self) -> Option<&TelemetryState> {
        self.data.as_ref()
    }

    pub fn tick(&self) -> Option<u64> {
        self.tick
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}
