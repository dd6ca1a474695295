//! Fan-out of snapshot frames to attached viewer sessions.
//!
//! The registry maps each session id to a bounded queue. Publishing walks
//! the registry once and uses `try_send`, so a slow viewer only loses its
//! own frames and never holds up the tick loop or other viewers.

use crate::metrics::{SNAPSHOTS_DROPPED_TOTAL, VIEWERS_CONNECTED, VIEWER_JOINS_TOTAL};
use crate::model::Frame;
use crate::session::ViewerSession;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of one publish pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dropped: usize,
    pub closed: usize,
}

#[derive(Debug)]
pub struct Broadcaster {
    sessions: Mutex<HashMap<Uuid, mpsc::Sender<Frame>>>,
    queue_capacity: usize,
}

impl Broadcaster {
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Registers a new session whose queue already holds `initial`.
    pub async fn attach(&self, initial: Frame) -> ViewerSession {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        // Fresh queue with capacity >= 1, cannot be full
        let _ = tx.try_send(initial);

        let id = Uuid::new_v4();
        let mut sessions = self.sessions.lock().await;
        sessions.insert(id, tx);
        VIEWERS_CONNECTED.set(sessions.len() as f64);
        VIEWER_JOINS_TOTAL.inc();

        ViewerSession::new(id, rx)
    }

    /// Removes a session. Returns false if it was already gone.
    pub async fn detach(&self, id: Uuid) -> bool {
        let mut sessions = self.sessions.lock().await;
        let removed = sessions.remove(&id).is_some();
        VIEWERS_CONNECTED.set(sessions.len() as f64);
        removed
    }

    pub async fn publish(&self, frame: &Frame) -> PublishReport {
        let mut report = PublishReport::default();
        let mut sessions = self.sessions.lock().await;

        sessions.retain(|id, tx| match tx.try_send(frame.clone()) {
            Ok(()) => {
                report.delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                report.dropped += 1;
                SNAPSHOTS_DROPPED_TOTAL.inc();
                warn!(session = %id, tick = frame.tick, "Viewer queue full, skipping tick");
                true
            }
            Err(TrySendError::Closed(_)) => {
                report.closed += 1;
                debug!(session = %id, "Viewer gone, removing from fan-out");
                false
            }
        });

        VIEWERS_CONNECTED.set(sessions.len() as f64);
        report
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops every sender so each session sees its queue end.
    pub async fn close_all(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let count = sessions.len();
        sessions.clear();
        VIEWERS_CONNECTED.set(0.0);
        count
    }
}
