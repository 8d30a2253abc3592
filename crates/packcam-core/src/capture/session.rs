use crate::capture::{Recorder, RecorderEvent};

use std::time::{Duration, Instant};

use tokio::{
    sync::mpsc,
    time::{Interval, MissedTickBehavior},
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Recorder, overlay timer and accumulated chunks of one recording.
pub(crate) struct RecordingSession {
    pub(crate) session_id: Uuid,
    pub(crate) tracking_code: String,
    pub(crate) started_at: Instant,
    pub(crate) overlay_timer: Interval,
    recorder: Box<dyn Recorder>,
    events: mpsc::UnboundedReceiver<RecorderEvent>,
    chunks: Vec<Vec<u8>>,
    stopped: bool,
}

impl RecordingSession {
    pub(crate) fn new(
        tracking_code: String,
        recorder: Box<dyn Recorder>,
        events: mpsc::UnboundedReceiver<RecorderEvent>,
        overlay_interval: Duration,
    ) -> Self {
        let mut overlay_timer = tokio::time::interval(overlay_interval);
        overlay_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            session_id: Uuid::new_v4(),
            tracking_code,
            started_at: Instant::now(),
            overlay_timer,
            recorder,
            events,
            chunks: Vec::new(),
            stopped: false,
        }
    }

    /// Move every chunk the recorder has delivered so far into the session.
    pub(crate) fn absorb_available(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.absorb(event);
        }
    }

    /// Ask the recorder to flush and hand back what is needed to finish the
    /// session off the controller.
    pub(crate) fn finish(mut self) -> FinishingSession {
        if let Err(e) = self.recorder.stop() {
            warn!(session_id = %self.session_id, error = %e, "Recorder did not stop cleanly");
        }
        self.absorb_available();

        FinishingSession {
            session_id: self.session_id,
            tracking_code: self.tracking_code,
            duration: self.started_at.elapsed(),
            events: self.events,
            chunks: self.chunks,
            stopped: self.stopped,
        }
    }

    /// Stop the recorder and drop everything it produced.
    pub(crate) fn discard(mut self) -> usize {
        if let Err(e) = self.recorder.stop() {
            warn!(session_id = %self.session_id, error = %e, "Recorder did not stop cleanly");
        }
        self.absorb_available();
        self.chunks.len()
    }

    fn absorb(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::DataAvailable(chunk) => self.chunks.push(chunk),
            RecorderEvent::Stopped => self.stopped = true,
        }
    }
}

/// A session whose recorder was asked to stop, owned by its finalizer task.
pub(crate) struct FinishingSession {
    pub(crate) session_id: Uuid,
    pub(crate) tracking_code: String,
    pub(crate) duration: Duration,
    events: mpsc::UnboundedReceiver<RecorderEvent>,
    chunks: Vec<Vec<u8>>,
    stopped: bool,
}

impl FinishingSession {
    /// Wait until the recorder has flushed, then concatenate every chunk.
    pub(crate) async fn into_recording(mut self) -> Vec<u8> {
        while !self.stopped {
            match self.events.recv().await {
                Some(RecorderEvent::DataAvailable(chunk)) => self.chunks.push(chunk),
                Some(RecorderEvent::Stopped) => self.stopped = true,
                None => {
                    warn!(
                        session_id = %self.session_id,
                        "Recorder went away without signalling stop"
                    );
                    break;
                }
            }
        }

        debug!(
            session_id = %self.session_id,
            chunk_count = self.chunks.len(),
            "Recorder finalized"
        );

        self.chunks.concat()
    }
}
