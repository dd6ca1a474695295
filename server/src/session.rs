use crate::model::Frame;
use tokio::sync::mpsc;
use uuid::Uuid;

/// One attached viewer: an id for diagnostics and the receiving end of its
/// frame queue.
///
/// Frames whose tick is not newer than the last one handed out are
/// skipped, so a viewer never sees ticks go backwards or repeat.
#[derive(Debug)]
pub struct ViewerSession {
    id: Uuid,
    rx: mpsc::Receiver<Frame>,
    last_tick: Option<u64>,
}

impl ViewerSession {
    pub(crate) fn new(id: Uuid, rx: mpsc::Receiver<Frame>) -> Self {
        Self {
            id,
            rx,
            last_tick: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Waits for the next frame. `None` once the broadcaster dropped us.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let frame = self.rx.recv().await?;
            if self.accept(&frame) {
                return Some(frame);
            }
        }
    }

    /// Non-blocking variant of [`next_frame`](Self::next_frame).
    pub fn try_next_frame(&mut self) -> Option<Frame> {
        while let Ok(frame) = self.rx.try_recv() {
            if self.accept(&frame) {
                return Some(frame);
            }
        }
        None
    }

    fn accept(&mut self, frame: &Frame) -> bool {
        if self.last_tick.is_some_and(|last| frame.tick <= last) {
            return false;
        }
        self.last_tick = Some(frame.tick);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcim_simulator::TelemetryState;

    #[test]
    fn test_stale_frames_skipped() {
        let (tx, rx) = mpsc::channel(8);
        let mut session = ViewerSession::new(Uuid::new_v4(), rx);
        let state = TelemetryState::initial();

        for tick in [4, 4, 3, 5] {
            tx.try_send(Frame::encode(tick, &state).unwrap()).unwrap();
        }

        assert_eq!(session.try_next_frame().map(|f| f.tick), Some(4));
        assert_eq!(session.try_next_frame().map(|f| f.tick), Some(5));
        assert!(session.try_next_frame().is_none());
    }
}
