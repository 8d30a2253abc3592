//! Capture state machine: camera stream lifecycle, recording sessions and
//! hand-off of finished recordings to the upload pipeline.

use crate::{
    Action, ActionKind, Operator, Toast,
    capture::{
        CaptureState, ControllerCommand, LocalSink, RecorderFactory, RecorderOptions,
        StreamConstraints, StreamSource, VideoStream,
        session::{FinishingSession, RecordingSession},
    },
    overlay::{DrawSurface, OverlayRenderer},
    upload::{StatusSink, UploadPipeline},
};

use std::{mem, sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinSet};
use tracing::{debug, error, info, instrument, warn};

/// Redraw period of the overlay while recording.
pub const OVERLAY_INTERVAL: Duration = Duration::from_millis(80);

/// Tunables of the capture controller.
#[derive(Debug, Clone, Copy)]
pub struct CaptureSettings {
    /// Camera format requested on device selection.
    pub constraints: StreamConstraints,
    /// Encoder settings for every session.
    pub recorder: RecorderOptions,
    /// Overlay redraw period.
    pub overlay_interval: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            recorder: RecorderOptions::default(),
            overlay_interval: OVERLAY_INTERVAL,
        }
    }
}

/// Platform capabilities the controller drives.
pub struct CaptureDevices {
    /// Camera access.
    pub source: Box<dyn StreamSource>,
    /// Offscreen compositing surface.
    pub surface: Box<dyn DrawSurface>,
    /// Encoder factory.
    pub recorders: Box<dyn RecorderFactory>,
    /// Destination of local copies.
    pub local: Arc<dyn LocalSink>,
}

enum Capture {
    Idle,
    Previewing {
        stream: Box<dyn VideoStream>,
    },
    Recording {
        stream: Box<dyn VideoStream>,
        session: RecordingSession,
    },
}

/// Owns the camera stream and at most one recording session.
///
/// All transitions happen on the task that owns the controller; finished
/// recordings are drained and uploaded on spawned tasks so the controller
/// is back in [`CaptureState::Previewing`] as soon as a session ends.
pub struct CaptureController {
    source: Box<dyn StreamSource>,
    surface: Box<dyn DrawSurface>,
    recorders: Box<dyn RecorderFactory>,
    local: Arc<dyn LocalSink>,
    status: Arc<dyn StatusSink>,
    pipeline: Arc<UploadPipeline>,
    renderer: OverlayRenderer,
    settings: CaptureSettings,
    operator: Operator,
    save_to_local: bool,
    last_action: Action,
    capture: Capture,
    finalizers: JoinSet<()>,
}

impl CaptureController {
    /// Create an idle controller.
    pub fn new(
        devices: CaptureDevices,
        pipeline: Arc<UploadPipeline>,
        status: Arc<dyn StatusSink>,
        renderer: OverlayRenderer,
        settings: CaptureSettings,
        operator: Operator,
    ) -> Self {
        Self {
            source: devices.source,
            surface: devices.surface,
            recorders: devices.recorders,
            local: devices.local,
            status,
            pipeline,
            renderer,
            settings,
            operator,
            save_to_local: false,
            last_action: Action::default(),
            capture: Capture::Idle,
            finalizers: JoinSet::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> CaptureState {
        match self.capture {
            Capture::Idle => CaptureState::Idle,
            Capture::Previewing { .. } => CaptureState::Previewing,
            Capture::Recording { .. } => CaptureState::Recording,
        }
    }

    /// Replace the operator drawn on the overlay and used for uploads.
    pub fn set_operator(&mut self, operator: Operator) {
        debug!(username = %operator.username, is_trial = operator.is_trial, "Operator updated");
        self.operator = operator;
    }

    /// Toggle saving a local copy of each finished recording.
    pub fn set_save_to_local(&mut self, enabled: bool) {
        debug!(enabled, "Save to local toggled");
        self.save_to_local = enabled;
    }

    /// React to a new action.
    ///
    /// A changed `device_id` re-acquires the camera (discarding any
    /// recording in flight); a changed `kind` starts or finishes a session.
    #[instrument(skip(self), fields(device_id = %action.device_id, kind = ?action.kind))]
    pub async fn apply_action(&mut self, action: Action) {
        let previous = mem::replace(&mut self.last_action, action.clone());

        if action.device_id != previous.device_id {
            self.select_device(&action.device_id).await;
        }

        if action.kind != previous.kind {
            match action.kind {
                ActionKind::Start => self.start_recording(&action.tracking_code),
                ActionKind::Stop | ActionKind::Idle => self.finish_recording(action.kind),
            }
        }
    }

    /// Redraw the overlay for the active session. No-op unless recording.
    pub fn render_overlay(&mut self) {
        if let Capture::Recording { stream, session } = &mut self.capture {
            session.absorb_available();
            let frame = stream.latest_frame();
            self.renderer.render(
                self.surface.as_mut(),
                frame.as_ref(),
                &session.tracking_code,
                &self.operator,
            );
        }
    }

    /// Wait for every finished recording to be uploaded (or fail).
    pub async fn wait_for_uploads(&mut self) {
        while let Some(joined) = self.finalizers.join_next().await {
            if let Err(e) = joined {
                error!(error = ?e, "Recording finalizer task panicked");
            }
        }
    }

    /// Finish any recording, wait for pending uploads and release the camera.
    #[instrument(skip(self))]
    pub async fn shutdown(&mut self) {
        self.finish_recording(ActionKind::Stop);
        self.wait_for_uploads().await;
        self.release_stream();
        info!("Capture controller shut down");
    }

    /// Drive the controller from `commands` until `Shutdown` or the channel
    /// closes, redrawing the overlay every tick while recording.
    #[instrument(skip(self, commands))]
    pub async fn run(mut self, mut commands: mpsc::Receiver<ControllerCommand>) {
        info!("Capture controller running");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ControllerCommand::Action(action)) => self.apply_action(action).await,
                    Some(ControllerCommand::SetOperator(operator)) => self.set_operator(operator),
                    Some(ControllerCommand::SetSaveToLocal(enabled)) => self.set_save_to_local(enabled),
                    Some(ControllerCommand::Shutdown) | None => break,
                },

                _ = next_overlay_tick(&mut self.capture) => self.render_overlay(),

                Some(joined) = self.finalizers.join_next(), if !self.finalizers.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = ?e, "Recording finalizer task panicked");
                    }
                }
            }
        }

        self.shutdown().await;
    }

    async fn select_device(&mut self, device_id: &str) {
        self.release_stream();

        if device_id.is_empty() {
            debug!("No device selected");
            return;
        }

        match self
            .source
            .acquire(device_id, &self.settings.constraints)
            .await
        {
            Ok(stream) => {
                info!(device_id, "Camera stream acquired");
                self.capture = Capture::Previewing { stream };
                self.status.handle_stream(true);
            }
            Err(e) => {
                error!(device_id, error = %e, "Error accessing camera");
                self.status.handle_stream(false);
            }
        }
    }

    /// Tear down the stream, discarding an in-flight recording.
    fn release_stream(&mut self) {
        match mem::replace(&mut self.capture, Capture::Idle) {
            Capture::Idle => {}
            Capture::Previewing { mut stream } => stream.stop_tracks(),
            Capture::Recording {
                mut stream,
                session,
            } => {
                let session_id = session.session_id;
                let tracking_code = session.tracking_code.clone();
                let dropped_chunks = session.discard();
                warn!(
                    session_id = %session_id,
                    tracking_code = %tracking_code,
                    dropped_chunks,
                    "Recording discarded by device change"
                );
                stream.stop_tracks();
            }
        }
    }

    fn start_recording(&mut self, tracking_code: &str) {
        let stream = match mem::replace(&mut self.capture, Capture::Idle) {
            Capture::Previewing { stream } => stream,
            Capture::Idle => {
                warn!(tracking_code, "Cannot record without a camera stream");
                return;
            }
            recording @ Capture::Recording { .. } => {
                debug!(tracking_code, "Already recording");
                self.capture = recording;
                return;
            }
        };

        // The feed still holds the last frame of the previous session until
        // this one is composed.
        let frame = stream.latest_frame();
        self.renderer.render(
            self.surface.as_mut(),
            frame.as_ref(),
            tracking_code,
            &self.operator,
        );

        let feed = self.surface.capture_stream();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        match self
            .recorders
            .open(feed, self.settings.recorder, events_tx)
        {
            Ok(recorder) => {
                let session = RecordingSession::new(
                    tracking_code.to_string(),
                    recorder,
                    events_rx,
                    self.settings.overlay_interval,
                );
                info!(
                    session_id = %session.session_id,
                    tracking_code,
                    bitrate = self.settings.recorder.video_bits_per_second,
                    "Recording started"
                );
                self.capture = Capture::Recording { stream, session };
            }
            Err(e) => {
                error!(tracking_code, error = %e, "Failed to open recorder");
                self.status.notify(Toast::recording_failed());
                self.capture = Capture::Previewing { stream };
            }
        }
    }

    fn finish_recording(&mut self, kind: ActionKind) {
        let (stream, session) = match mem::replace(&mut self.capture, Capture::Idle) {
            Capture::Recording { stream, session } => (stream, session),
            other => {
                debug!(?kind, "No recording to finish");
                self.capture = other;
                return;
            }
        };

        let finishing = session.finish();
        info!(
            session_id = %finishing.session_id,
            tracking_code = %finishing.tracking_code,
            duration_ms = finishing.duration.as_millis(),
            ?kind,
            "Recording stopped"
        );

        self.capture = Capture::Previewing { stream };

        let local = self.save_to_local.then(|| Arc::clone(&self.local));
        self.finalizers.spawn(finalize(
            finishing,
            local,
            Arc::clone(&self.pipeline),
            self.operator.clone(),
        ));
    }
}

async fn next_overlay_tick(capture: &mut Capture) {
    match capture {
        Capture::Recording { session, .. } => {
            session.overlay_timer.tick().await;
        }
        Capture::Idle | Capture::Previewing { .. } => std::future::pending().await,
    }
}

async fn finalize(
    finishing: FinishingSession,
    local: Option<Arc<dyn LocalSink>>,
    pipeline: Arc<UploadPipeline>,
    operator: Operator,
) {
    let session_id = finishing.session_id;
    let tracking_code = finishing.tracking_code.clone();
    let recording = finishing.into_recording().await;

    if let Some(local) = local {
        let file_name = format!("{tracking_code}.webm");
        match local.save(&file_name, &recording) {
            Ok(()) => info!(session_id = %session_id, file_name, "Recording saved locally"),
            Err(e) => error!(session_id = %session_id, error = %e, "Failed to save recording locally"),
        }
    }

    match pipeline.upload(&tracking_code, &operator, recording).await {
        Ok(result) => debug!(session_id = %session_id, video = ?result.video, "Recording uploaded"),
        Err(e) => error!(session_id = %session_id, error = %e, "Recording upload failed"),
    }
}
