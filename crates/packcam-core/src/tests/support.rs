//! Test doubles for every capability seam.

use crate::{
    CaptureController, CaptureDevices, CaptureError, CaptureSettings, Clock, Color, CoreResult,
    DrawSurface, FontSpec, Frame, FrameFeed, LocalSink, Operator, OverlayRenderer, Recorder,
    RecorderEvent, RecorderFactory, RecorderOptions, StatusSink, StreamConstraints, StreamSource,
    Toast, UploadCredentials, UploadPipeline, UploadTicket, UploadTransport, VideoReference,
    VideoStream,
};

use std::{
    panic::Location,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};

pub(crate) const STANDARD_TOKEN: &str = "standard-token";
pub(crate) const TRIAL_TOKEN: &str = "trial-token";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn transport_error(reason: &str) -> CaptureError {
    CaptureError::Transport {
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// 15/10/2026 14:05:09.
pub(crate) fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 15)
        .and_then(|d| d.and_hms_opt(14, 5, 9))
        .unwrap_or_default()
}

pub(crate) struct FixedClock(pub(crate) NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Camera

#[derive(Default)]
pub(crate) struct CameraTally {
    pub(crate) acquired: Mutex<Vec<String>>,
    pub(crate) stopped: Mutex<usize>,
}

pub(crate) struct FakeStream {
    tally: Arc<CameraTally>,
    stopped: bool,
}

impl VideoStream for FakeStream {
    fn latest_frame(&self) -> Option<Frame> {
        Some(Frame::new(2, 2, vec![0x80; 16]))
    }

    fn stop_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            *lock(&self.tally.stopped) += 1;
        }
    }
}

pub(crate) struct FakeSource {
    pub(crate) tally: Arc<CameraTally>,
    /// Devices that refuse to open.
    pub(crate) unavailable: Vec<String>,
}

#[async_trait]
impl StreamSource for FakeSource {
    async fn acquire(
        &mut self,
        device_id: &str,
        _constraints: &StreamConstraints,
    ) -> CoreResult<Box<dyn VideoStream>> {
        if self.unavailable.iter().any(|d| d == device_id) {
            return Err(CaptureError::StreamUnavailable {
                device_id: device_id.to_string(),
                reason: "permission denied".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        lock(&self.tally.acquired).push(device_id.to_string());

        Ok(Box::new(FakeStream {
            tally: Arc::clone(&self.tally),
            stopped: false,
        }))
    }
}

// ---------------------------------------------------------------------------
// Surface

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Clear,
    Frame,
    Fill {
        text: String,
        x: f32,
        y: f32,
        font: FontSpec,
        color: Color,
    },
    Stroke {
        text: String,
        x: f32,
        y: f32,
        color: Color,
        line_width: f32,
    },
    Present,
}

/// Presented frames carry the first text filled since the last clear as
/// their pixels, so tests can tell which session composed them.
pub(crate) struct RecordingSurface {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) ops: Arc<Mutex<Vec<DrawOp>>>,
    first_fill: Option<String>,
    feed: watch::Sender<Option<Frame>>,
}

impl RecordingSurface {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        let (feed, _) = watch::channel(None);
        Self {
            width,
            height,
            ops: Arc::new(Mutex::new(Vec::new())),
            first_fill: None,
            feed,
        }
    }

    /// Width model: every glyph advances 0.6 em.
    pub(crate) fn text_width(text: &str, font: &FontSpec) -> f32 {
        text.chars().count() as f32 * font.size_px * 0.6
    }

    pub(crate) fn fills(&self) -> Vec<DrawOp> {
        lock(&self.ops)
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { .. }))
            .cloned()
            .collect()
    }
}

impl DrawSurface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self) {
        self.first_fill = None;
        lock(&self.ops).push(DrawOp::Clear);
    }

    fn draw_frame(&mut self, _frame: &Frame) {
        lock(&self.ops).push(DrawOp::Frame);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, font: &FontSpec, color: Color) {
        self.first_fill.get_or_insert_with(|| text.to_string());
        lock(&self.ops).push(DrawOp::Fill {
            text: text.to_string(),
            x,
            y,
            font: *font,
            color,
        });
    }

    fn stroke_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        _font: &FontSpec,
        color: Color,
        line_width: f32,
    ) {
        lock(&self.ops).push(DrawOp::Stroke {
            text: text.to_string(),
            x,
            y,
            color,
            line_width,
        });
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> f32 {
        Self::text_width(text, font)
    }

    fn present(&mut self) {
        lock(&self.ops).push(DrawOp::Present);
        let pixels = self.first_fill.clone().unwrap_or_default().into_bytes();
        self.feed
            .send_replace(Some(Frame::new(self.width, self.height, pixels)));
    }

    fn capture_stream(&mut self) -> FrameFeed {
        self.feed.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Recorder

#[derive(Default)]
pub(crate) struct RecorderTally {
    pub(crate) opened: Mutex<usize>,
    pub(crate) active: Mutex<usize>,
    pub(crate) max_active: Mutex<usize>,
    pub(crate) options: Mutex<Vec<RecorderOptions>>,
    /// Frame waiting on the feed when each recorder was opened.
    pub(crate) first_frames: Mutex<Vec<Option<Frame>>>,
}

/// Emits `chunks` one-byte chunks (values `0..chunks`) when stopped,
/// followed by `Stopped`.
pub(crate) struct FakeRecorder {
    tally: Arc<RecorderTally>,
    events: mpsc::UnboundedSender<RecorderEvent>,
    chunks: usize,
    stopped: bool,
}

impl Recorder for FakeRecorder {
    fn stop(&mut self) -> CoreResult<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        *lock(&self.tally.active) -= 1;

        for i in 0..self.chunks {
            let _ = self
                .events
                .send(RecorderEvent::DataAvailable(vec![i as u8]));
        }
        let _ = self.events.send(RecorderEvent::Stopped);

        Ok(())
    }
}

pub(crate) struct FakeRecorderFactory {
    pub(crate) tally: Arc<RecorderTally>,
    pub(crate) chunks: usize,
    pub(crate) fail_open: bool,
}

impl RecorderFactory for FakeRecorderFactory {
    fn open(
        &mut self,
        feed: FrameFeed,
        options: RecorderOptions,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> CoreResult<Box<dyn Recorder>> {
        if self.fail_open {
            return Err(CaptureError::RecorderFailed {
                reason: "encoder missing".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        *lock(&self.tally.opened) += 1;
        lock(&self.tally.options).push(options);
        lock(&self.tally.first_frames).push(feed.borrow().clone());
        let active = {
            let mut active = lock(&self.tally.active);
            *active += 1;
            *active
        };
        let mut max_active = lock(&self.tally.max_active);
        *max_active = (*max_active).max(active);

        Ok(Box::new(FakeRecorder {
            tally: Arc::clone(&self.tally),
            events,
            chunks: self.chunks,
            stopped: false,
        }))
    }
}

// ---------------------------------------------------------------------------
// Local sink, status, transport

#[derive(Default)]
pub(crate) struct MemorySink {
    pub(crate) saved: Mutex<Vec<(String, Vec<u8>)>>,
}

impl LocalSink for MemorySink {
    fn save(&self, file_name: &str, data: &[u8]) -> CoreResult<()> {
        lock(&self.saved).push((file_name.to_string(), data.to_vec()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum StatusEvent {
    Stream(bool),
    Progress {
        in_progress: bool,
        tracking_code: String,
        video_id: Option<String>,
    },
    Toast(Toast),
}

#[derive(Default)]
pub(crate) struct RecordingStatus {
    pub(crate) events: Mutex<Vec<StatusEvent>>,
}

impl RecordingStatus {
    pub(crate) fn events(&self) -> Vec<StatusEvent> {
        lock(&self.events).clone()
    }

    pub(crate) fn toasts(&self) -> Vec<Toast> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::Toast(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn progress(&self) -> Vec<(bool, Option<String>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::Progress {
                    in_progress,
                    video_id,
                    ..
                } => Some((in_progress, video_id)),
                _ => None,
            })
            .collect()
    }
}

impl StatusSink for RecordingStatus {
    fn handle_stream(&self, active: bool) {
        lock(&self.events).push(StatusEvent::Stream(active));
    }

    fn handle_uploading_progress(
        &self,
        in_progress: bool,
        tracking_code: &str,
        video: Option<&VideoReference>,
    ) {
        lock(&self.events).push(StatusEvent::Progress {
            in_progress,
            tracking_code: tracking_code.to_string(),
            video_id: video.map(|v| v.video_id.clone()),
        });
    }

    fn notify(&self, toast: Toast) {
        lock(&self.events).push(StatusEvent::Toast(toast));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransportCall {
    Part { token: String, data: Vec<u8> },
    Last { token: String, data: Vec<u8> },
}

#[derive(Default)]
pub(crate) struct FakeTransport {
    pub(crate) calls: Mutex<Vec<TransportCall>>,
    pub(crate) fail_part: bool,
    pub(crate) fail_last: bool,
}

impl FakeTransport {
    pub(crate) fn calls(&self) -> Vec<TransportCall> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl UploadTransport for FakeTransport {
    async fn upload_part(&self, ticket: &mut UploadTicket, data: Vec<u8>) -> CoreResult<()> {
        lock(&self.calls).push(TransportCall::Part {
            token: ticket.token.clone(),
            data,
        });
        if self.fail_part {
            return Err(transport_error("part rejected"));
        }
        ticket.parts_sent += 1;
        ticket.video_id = Some("vi-test".to_string());
        Ok(())
    }

    async fn upload_last_part(
        &self,
        ticket: &mut UploadTicket,
        data: Vec<u8>,
    ) -> CoreResult<VideoReference> {
        lock(&self.calls).push(TransportCall::Last {
            token: ticket.token.clone(),
            data,
        });
        if self.fail_last {
            return Err(transport_error("last part rejected"));
        }
        ticket.parts_sent += 1;
        Ok(VideoReference {
            video_id: "vi-test".to_string(),
            title: ticket.video_name.clone(),
            player_url: Some("https://embed.api.video/vod/vi-test".to_string()),
            mp4_url: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Assembled controller

pub(crate) struct HarnessOptions {
    pub(crate) chunks: usize,
    pub(crate) fail_open: bool,
    pub(crate) fail_part: bool,
    pub(crate) fail_last: bool,
    pub(crate) unavailable: Vec<String>,
    pub(crate) min_part_size: usize,
    pub(crate) operator: Operator,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            chunks: 10,
            fail_open: false,
            fail_part: false,
            fail_last: false,
            unavailable: Vec::new(),
            min_part_size: 4,
            operator: Operator::new("jdoe", false),
        }
    }
}

pub(crate) struct Harness {
    pub(crate) controller: CaptureController,
    pub(crate) camera: Arc<CameraTally>,
    pub(crate) recorder: Arc<RecorderTally>,
    pub(crate) surface_ops: Arc<Mutex<Vec<DrawOp>>>,
    pub(crate) sink: Arc<MemorySink>,
    pub(crate) status: Arc<RecordingStatus>,
    pub(crate) transport: Arc<FakeTransport>,
}

impl Harness {
    pub(crate) fn new(options: HarnessOptions) -> Self {
        let camera = Arc::new(CameraTally::default());
        let recorder = Arc::new(RecorderTally::default());
        let sink = Arc::new(MemorySink::default());
        let status = Arc::new(RecordingStatus::default());
        let transport = Arc::new(FakeTransport {
            fail_part: options.fail_part,
            fail_last: options.fail_last,
            ..FakeTransport::default()
        });
        let surface = RecordingSurface::new(1280, 960);
        let surface_ops = Arc::clone(&surface.ops);

        let pipeline = Arc::new(UploadPipeline::new(
            Arc::clone(&transport) as Arc<dyn UploadTransport>,
            UploadCredentials::new(STANDARD_TOKEN, TRIAL_TOKEN),
            Arc::clone(&status) as Arc<dyn StatusSink>,
            options.min_part_size,
        ));

        let devices = CaptureDevices {
            source: Box::new(FakeSource {
                tally: Arc::clone(&camera),
                unavailable: options.unavailable,
            }),
            surface: Box::new(surface),
            recorders: Box::new(FakeRecorderFactory {
                tally: Arc::clone(&recorder),
                chunks: options.chunks,
                fail_open: options.fail_open,
            }),
            local: Arc::clone(&sink) as Arc<dyn LocalSink>,
        };

        let settings = CaptureSettings {
            overlay_interval: Duration::from_millis(80),
            ..CaptureSettings::default()
        };

        let controller = CaptureController::new(
            devices,
            pipeline,
            Arc::clone(&status) as Arc<dyn StatusSink>,
            OverlayRenderer::new(Arc::new(FixedClock(fixed_time())), "TRIAL"),
            settings,
            options.operator,
        );

        Self {
            controller,
            camera,
            recorder,
            surface_ops,
            sink,
            status,
            transport,
        }
    }
}
