//! Capability seams the capture controller is written against.
//!
//! Camera access, encoding and local persistence are platform concerns; the
//! controller only sees these traits so the state machine can be driven by
//! test doubles.

use crate::CoreResult;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

/// One RGBA8 video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub pixels: Arc<Vec<u8>>,
}

impl Frame {
    /// Wrap raw RGBA8 pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: Arc::new(pixels),
        }
    }
}

/// Latest composed frame of a drawing surface, sampled by the recorder.
pub type FrameFeed = watch::Receiver<Option<Frame>>;

/// Requested camera format. Video only, no audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Preferred width.
    pub ideal_width: u32,
    /// Preferred height.
    pub ideal_height: u32,
    /// Smallest acceptable width.
    pub min_width: u32,
    /// Smallest acceptable height.
    pub min_height: u32,
    /// Largest acceptable width.
    pub max_width: u32,
    /// Largest acceptable height.
    pub max_height: u32,
    /// Preferred frame rate.
    pub ideal_frame_rate: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 960,
            min_width: 480,
            min_height: 480,
            max_width: 1920,
            max_height: 1080,
            ideal_frame_rate: 30,
        }
    }
}

impl StreamConstraints {
    /// Whether an actual camera resolution satisfies the bounds.
    pub fn accepts(&self, width: u32, height: u32) -> bool {
        (self.min_width..=self.max_width).contains(&width)
            && (self.min_height..=self.max_height).contains(&height)
    }
}

/// Live camera stream owned by the capture controller.
pub trait VideoStream: Send {
    /// Most recent camera frame, if one has arrived.
    fn latest_frame(&self) -> Option<Frame>;

    /// Stop every track of the stream. Idempotent.
    fn stop_tracks(&mut self);
}

/// Opens camera streams.
#[async_trait]
pub trait StreamSource: Send {
    /// Acquire a video stream from `device_id`.
    async fn acquire(
        &mut self,
        device_id: &str,
        constraints: &StreamConstraints,
    ) -> CoreResult<Box<dyn VideoStream>>;
}

/// Encoder settings for a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderOptions {
    /// Frames per second sampled from the surface.
    pub frame_rate: u32,
    /// Target video bitrate in bits per second.
    pub video_bits_per_second: u64,
}

impl Default for RecorderOptions {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            video_bits_per_second: 3 * 1024 * 1024,
        }
    }
}

/// Output of a running recorder.
///
/// Delivered in order on a single channel: every `DataAvailable` of a
/// session precedes its `Stopped`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// Encoded bytes became available.
    DataAvailable(Vec<u8>),
    /// The recorder flushed everything and finished.
    Stopped,
}

/// A running encoder.
pub trait Recorder: Send {
    /// Ask the recorder to flush and finish. `RecorderEvent::Stopped`
    /// follows once all data has been delivered.
    fn stop(&mut self) -> CoreResult<()>;
}

/// Opens recorders targeting a surface frame feed.
pub trait RecorderFactory: Send {
    /// Start recording `feed`, reporting output on `events`.
    fn open(
        &mut self,
        feed: FrameFeed,
        options: RecorderOptions,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> CoreResult<Box<dyn Recorder>>;
}

/// Destination for the operator-toggled local copy of a recording.
pub trait LocalSink: Send + Sync {
    /// Persist `data` under `file_name`.
    fn save(&self, file_name: &str, data: &[u8]) -> CoreResult<()>;
}
