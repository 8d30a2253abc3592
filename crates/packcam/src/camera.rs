//! Camera access through nokhwa.
//!
//! The nokhwa camera handle is not `Send`, so each stream owns a dedicated
//! capture thread that opens the device, reports the negotiated format and
//! then keeps the latest decoded frame in a shared slot. Released threads are
//! joined off the runtime before the next device opens.

use crate::{AppError, AppResult};

use std::{
    mem,
    panic::Location,
    sync::{
        Arc, Mutex, PoisonError, Weak,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use nokhwa::{
    Camera,
    pixel_format::RgbAFormat,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
        Resolution,
    },
};
use packcam_core::{
    CaptureError, CoreResult, Frame, StatusSink, StreamConstraints, StreamSource, VideoStream,
};
use tokio::{sync::oneshot, task};
use tracing::{debug, error, info, instrument, warn};

/// A camera the station can select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CameraDevice {
    pub(crate) device_id: String,
    pub(crate) name: String,
}

/// Enumerate cameras, identified the way `device <id>` expects.
#[track_caller]
pub(crate) fn list_devices() -> AppResult<Vec<CameraDevice>> {
    let cameras = nokhwa::query(ApiBackend::Auto).map_err(|e| AppError::Capture {
        source: CaptureError::StreamUnavailable {
            device_id: String::new(),
            reason: format!("Failed to enumerate cameras: {}", e),
            location: ErrorLocation::from(Location::caller()),
        },
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(cameras
        .into_iter()
        .map(|info| CameraDevice {
            device_id: match info.index() {
                CameraIndex::Index(i) => i.to_string(),
                CameraIndex::String(s) => s.clone(),
            },
            name: info.human_name(),
        })
        .collect())
}

/// Numeric ids select by index, anything else by platform identifier.
pub(crate) fn camera_index(device_id: &str) -> CameraIndex {
    match device_id.parse::<u32>() {
        Ok(index) => CameraIndex::Index(index),
        Err(_) => CameraIndex::String(device_id.to_string()),
    }
}

/// Consecutive capture failures after which the camera is reported lost.
pub(crate) const MAX_FRAME_FAILURES: u32 = 50;
const FRAME_RETRY_BASE: Duration = Duration::from_millis(20);
const FRAME_RETRY_MAX: Duration = Duration::from_secs(1);
/// How long opening a device waits for released capture threads.
pub(crate) const RETIRE_JOIN_TIMEOUT: Duration = Duration::from_secs(3);

type LatestFrame = Arc<Mutex<Option<Frame>>>;

/// Backoff between failed frame captures.
#[derive(Debug, Default)]
pub(crate) struct FrameFailures {
    consecutive: u32,
}

impl FrameFailures {
    pub(crate) fn succeeded(&mut self) {
        self.consecutive = 0;
    }

    /// Delay before the next capture, or `None` once the camera is lost.
    pub(crate) fn failed(&mut self) -> Option<Duration> {
        self.consecutive += 1;
        if self.consecutive >= MAX_FRAME_FAILURES {
            return None;
        }
        let factor = 1u32 << (self.consecutive - 1).min(6);
        Some((FRAME_RETRY_BASE * factor).min(FRAME_RETRY_MAX))
    }
}

/// Capture threads of released streams.
///
/// A thread may be blocked inside the driver, so it is never joined on a
/// runtime worker.
#[derive(Debug, Clone, Default)]
pub(crate) struct RetiredThreads(Arc<Mutex<Vec<JoinHandle<()>>>>);

impl RetiredThreads {
    pub(crate) fn retire(&self, handle: JoinHandle<()>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Join every retired thread on the blocking pool, giving up on each
    /// after `timeout`.
    pub(crate) async fn join_all(&self, timeout: Duration) {
        let handles = mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner));

        for handle in handles {
            let joined = tokio::time::timeout(timeout, task::spawn_blocking(move || handle.join()));
            match joined.await {
                Ok(Ok(Ok(()))) => {}
                Ok(Ok(Err(_))) => error!("Capture thread panicked"),
                Ok(Err(e)) => error!(error = %e, "Failed to join capture thread"),
                Err(_) => warn!(
                    timeout_ms = timeout.as_millis(),
                    "Capture thread still busy, leaving it detached"
                ),
            }
        }
    }
}

/// Opens nokhwa camera streams.
pub(crate) struct NokhwaSource {
    status: Arc<dyn StatusSink>,
    retired: RetiredThreads,
}

impl NokhwaSource {
    /// `status` hears about cameras lost mid-stream.
    pub(crate) fn new(status: Arc<dyn StatusSink>, retired: RetiredThreads) -> Self {
        Self { status, retired }
    }
}

#[async_trait]
impl StreamSource for NokhwaSource {
    #[instrument(skip(self, constraints))]
    async fn acquire(
        &mut self,
        device_id: &str,
        constraints: &StreamConstraints,
    ) -> CoreResult<Box<dyn VideoStream>> {
        // The previous stream may still hold the device.
        self.retired.join_all(RETIRE_JOIN_TIMEOUT).await;

        let (ready_tx, ready_rx) = oneshot::channel();
        let latest: LatestFrame = Arc::new(Mutex::new(None));
        let running = Arc::new(AtomicBool::new(true));

        let handle = thread::Builder::new()
            .name(format!("camera-{device_id}"))
            .spawn({
                let index = camera_index(device_id);
                let constraints = *constraints;
                let latest = Arc::clone(&latest);
                let running = Arc::clone(&running);
                // Weak so a thread stuck in the driver never keeps the
                // station's event channel open.
                let status = Arc::downgrade(&self.status);
                move || capture_loop(index, constraints, latest, running, status, ready_tx)
            })
            .map_err(|e| CaptureError::StreamUnavailable {
                device_id: device_id.to_string(),
                reason: format!("Failed to spawn capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let unavailable = |reason: String| CaptureError::StreamUnavailable {
            device_id: device_id.to_string(),
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        match ready_rx.await {
            Ok(Ok(resolution)) => {
                info!(
                    device_id,
                    width = resolution.width(),
                    height = resolution.height(),
                    "Camera opened"
                );
                Ok(Box::new(NokhwaStream {
                    latest,
                    running,
                    handle: Some(handle),
                    retired: self.retired.clone(),
                }))
            }
            Ok(Err(reason)) => {
                self.retired.retire(handle);
                Err(unavailable(reason))
            }
            Err(_) => Err(unavailable("Capture thread exited before the camera opened".to_string())),
        }
    }
}

fn capture_loop(
    index: CameraIndex,
    constraints: StreamConstraints,
    latest: LatestFrame,
    running: Arc<AtomicBool>,
    status: Weak<dyn StatusSink>,
    ready: oneshot::Sender<Result<Resolution, String>>,
) {
    let format = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::Closest(
        CameraFormat::new(
            Resolution::new(constraints.ideal_width, constraints.ideal_height),
            FrameFormat::MJPEG,
            constraints.ideal_frame_rate,
        ),
    ));

    let mut camera = match Camera::new(index.clone(), format) {
        Ok(camera) => camera,
        Err(e) => {
            let _ = ready.send(Err(format!("Failed to open camera {:?}: {}", index, e)));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = ready.send(Err(format!("Failed to open camera stream: {}", e)));
        return;
    }

    let resolution = camera.resolution();
    if !constraints.accepts(resolution.width(), resolution.height()) {
        let _ = camera.stop_stream();
        let _ = ready.send(Err(format!(
            "Camera resolution {}x{} is outside {}x{}..={}x{}",
            resolution.width(),
            resolution.height(),
            constraints.min_width,
            constraints.min_height,
            constraints.max_width,
            constraints.max_height
        )));
        return;
    }

    if ready.send(Ok(resolution)).is_err() {
        let _ = camera.stop_stream();
        return;
    }

    let mut frame_count: u64 = 0;
    let mut failures = FrameFailures::default();

    while running.load(Ordering::SeqCst) {
        // Blocks until the camera delivers the next frame.
        match camera.frame() {
            Ok(buffer) => {
                failures.succeeded();
                match buffer.decode_image::<RgbAFormat>() {
                    Ok(image) => {
                        let frame = Frame::new(image.width(), image.height(), image.into_raw());
                        *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);
                        frame_count += 1;
                    }
                    Err(e) => debug!(error = %e, "Failed to decode camera frame"),
                }
            }
            Err(e) => match failures.failed() {
                Some(delay) => {
                    debug!(error = %e, delay_ms = delay.as_millis(), "Failed to capture frame");
                    thread::sleep(delay);
                }
                None => {
                    error!(
                        error = %e,
                        failures = MAX_FRAME_FAILURES,
                        "Camera stopped delivering frames, stream lost"
                    );
                    *latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
                    if running.load(Ordering::SeqCst)
                        && let Some(status) = status.upgrade()
                    {
                        status.handle_stream(false);
                    }
                    break;
                }
            },
        }
    }

    if let Err(e) = camera.stop_stream() {
        warn!(error = %e, "Error stopping camera stream");
    }

    info!(frame_count, "Camera capture thread stopped");
}

/// Live nokhwa stream. Dropping it stops the capture thread.
pub(crate) struct NokhwaStream {
    latest: LatestFrame,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    retired: RetiredThreads,
}

impl VideoStream for NokhwaStream {
    fn latest_frame(&self) -> Option<Frame> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn stop_tracks(&mut self) {
        self.running.store(false, Ordering::SeqCst);

        // Joined by the next acquire so the device is free before it reopens.
        if let Some(handle) = self.handle.take() {
            self.retired.retire(handle);
        }
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
