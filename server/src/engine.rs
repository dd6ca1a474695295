//! Owner of the authoritative telemetry state.
//!
//! All mutation goes through [`TelemetryEngine::tick`]; reads copy the state
//! under the same lock, so no caller can observe a half-applied tick. The
//! engine hands each encoded frame to the [`Broadcaster`] after releasing
//! the state lock.

use crate::broadcast::{Broadcaster, PublishReport};
use crate::config::EngineConfig;
use crate::errors::Result;
use crate::metrics::{INVARIANT_VIOLATIONS_TOTAL, TICKS_TOTAL, TICK_DURATION_SECONDS};
use crate::model::{Frame, Snapshot};
use crate::session::ViewerSession;
use chrono::{DateTime, Utc};
use dcim_simulator::{validate, Simulator, TelemetryState};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

struct Core {
    tick: u64,
    state: TelemetryState,
    simulator: Simulator,
}

pub struct TelemetryEngine {
    core: Mutex<Core>,
    broadcaster: Broadcaster,
    started_at: DateTime<Utc>,
}

impl TelemetryEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_state(config, TelemetryState::initial())
    }

    pub fn with_state(config: &EngineConfig, state: TelemetryState) -> Self {
        let tick_secs = config.tick_interval.as_secs_f64();
        let simulator = match config.seed {
            Some(seed) => Simulator::seeded(&state, tick_secs, seed),
            None => Simulator::new(&state, tick_secs),
        };

        Self {
            core: Mutex::new(Core {
                tick: 0,
                state,
                simulator,
            }),
            broadcaster: Broadcaster::new(config.viewer_queue),
            started_at: Utc::now(),
        }
    }

    /// Applies one tick and publishes the resulting frame to every viewer.
    pub async fn tick(&self) -> Result<(Frame, PublishReport)> {
        let start = Instant::now();

        let frame = {
            let mut guard = self.core.lock().await;
            let core = &mut *guard;
            core.simulator.advance(&mut core.state);
            core.tick += 1;

            if let Err(e) = validate(&core.state) {
                INVARIANT_VIOLATIONS_TOTAL.inc();
                warn!(tick = core.tick, "Snapshot failed validation: {}", e);
            }

            Frame::encode(core.tick, &core.state)?
        };

        let report = self.broadcaster.publish(&frame).await;
        TICKS_TOTAL.inc();
        TICK_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());

        debug!(
            tick = frame.tick,
            delivered = report.delivered,
            dropped = report.dropped,
            closed = report.closed,
            "Tick published"
        );

        Ok((frame, report))
    }

    /// Copy of the state as of the last completed tick.
    pub async fn snapshot(&self) -> Snapshot {
        let core = self.core.lock().await;
        Snapshot {
            tick: core.tick,
            state: core.state.clone(),
        }
    }

    pub async fn current_frame(&self) -> Result<Frame> {
        let core = self.core.lock().await;
        Frame::encode(core.tick, &core.state)
    }

    /// Attaches a viewer. Its queue starts with the current snapshot, taken
    /// under the state lock so it sits exactly on a tick boundary.
    pub async fn join(&self) -> Result<ViewerSession> {
        let core = self.core.lock().await;
        let initial = Frame::encode(core.tick, &core.state)?;
        let session = self.broadcaster.attach(initial).await;
        drop(core);

        info!(session = %session.id(), "Viewer joined");
        Ok(session)
    }

    pub async fn leave(&self, id: Uuid) {
        if self.broadcaster.detach(id).await {
            info!(session = %id, "Viewer left");
        }
    }

    pub async fn viewer_count(&self) -> usize {
        self.broadcaster.len().await
    }

    /// Disconnects every viewer. The state itself is left as is.
    pub async fn shutdown(&self) {
        let closed = self.broadcaster.close_all().await;
        info!("Closed {} viewer session(s)", closed);
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Envelope;

    fn engine() -> TelemetryEngine {
        TelemetryEngine::new(&EngineConfig {
            seed: Some(17),
            ..EngineConfig::default()
        })
    }

    fn decode(frame: &Frame) -> Envelope<TelemetryState> {
        serde_json::from_str(&frame.text).unwrap()
    }

    #[tokio::test]
    async fn test_tick_counter_and_snapshot() {
        let engine = engine();
        assert_eq!(engine.snapshot().await.tick, 0);

        let (frame, _) = engine.tick().await.unwrap();
        let snap = engine.snapshot().await;
        assert_eq!(frame.tick, 1);
        assert_eq!(snap.tick, 1);
        assert_eq!(decode(&frame).data, snap.state);
    }

    #[tokio::test]
    async fn test_join_between_ticks_sees_last_tick() {
        let engine = engine();
        engine.tick().await.unwrap();
        engine.tick().await.unwrap();
        let before = engine.snapshot().await;

        let mut session = engine.join().await.unwrap();
        let first = session.try_next_frame().unwrap();
        let envelope = decode(&first);

        assert_eq!(envelope.tick, 2);
        assert_eq!(envelope.data, before.state);
    }

    #[tokio::test]
    async fn test_viewers_get_identical_payloads() {
        let engine = engine();
        let mut a = engine.join().await.unwrap();
        let mut b = engine.join().await.unwrap();
        a.try_next_frame();
        b.try_next_frame();

        let (_, report) = engine.tick().await.unwrap();
        assert_eq!(report.delivered, 2);

        let fa = a.try_next_frame().unwrap();
        let fb = b.try_next_frame().unwrap();
        assert_eq!(fa.text.as_bytes(), fb.text.as_bytes());
    }

    #[tokio::test]
    async fn test_leave_stops_delivery() {
        let engine = engine();
        let session = engine.join().await.unwrap();
        engine.leave(session.id()).await;

        let (_, report) = engine.tick().await.unwrap();
        assert_eq!(report, PublishReport::default());
        assert_eq!(engine.viewer_count().await, 0);
    }

    #[tokio::test]
    async fn test_dropped_session_cleaned_without_error() {
        let engine = engine();
        drop(engine.join().await.unwrap());

        let (_, first) = engine.tick().await.unwrap();
        assert_eq!(first.closed, 1);
        let (_, second) = engine.tick().await.unwrap();
        assert_eq!(second.delivered + second.dropped + second.closed, 0);
    }

    #[tokio::test]
    async fn test_shutdown_ends_sessions() {
        let engine = engine();
        let mut session = engine.join().await.unwrap();
        session.try_next_frame();

        engine.shutdown().await;
        assert!(session.next_frame().await.is_none());
        assert_eq!(engine.viewer_count().await, 0);
    }

    #[tokio::test]
    async fn test_outdoor_walk_from_custom_state() {
        let mut state = TelemetryState::initial();
        state.env_data.outdoor_temp = 29.9;
        let engine = TelemetryEngine::with_state(
            &EngineConfig {
                seed: Some(23),
                ..EngineConfig::default()
            },
            state,
        );

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..2_000 {
            let (frame, _) = engine.tick().await.unwrap();
            let outdoor = decode(&frame).data.env_data.outdoor_temp;
            assert!((10.0..=30.0).contains(&outdoor), "outdoor {}", outdoor);
            seen.insert((outdoor * 10.0).round() as i64);
        }
        assert!(seen.len() > 1, "outdoor temperature never moved");
    }

    #[tokio::test]
    async fn test_sixty_one_ticks_rotate_history() {
        let engine = engine();
        let seed = engine.snapshot().await.state.env_data.history;

        let mut newest = Vec::new();
        for _ in 0..61 {
            engine.tick().await.unwrap();
            let snap = engine.snapshot().await;
            assert_eq!(snap.state.env_data.history.len(), 60);
            newest.push(*snap.state.env_data.history.last().unwrap());
        }

        let history = engine.snapshot().await.state.env_data.history;
        assert_eq!(history.first(), Some(&newest[1]));
        assert_ne!(history, seed);
    }
}
