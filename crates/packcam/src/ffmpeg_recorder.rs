//! WebM encoding through an `ffmpeg` child process.
//!
//! Raw RGBA frames sampled from the surface feed go to ffmpeg's stdin; the
//! encoded stream on its stdout is forwarded as recorder events. Stopping
//! closes stdin, ffmpeg flushes, and `Stopped` follows the last chunk.

use crate::{AppError, AppResult};

use std::{
    io::{ErrorKind, Read, Write},
    panic::Location,
    process::{ChildStdin, ChildStdout, Command, Stdio},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use packcam_core::{
    CaptureError, CoreResult, FrameFeed, Recorder, RecorderEvent, RecorderFactory,
    RecorderOptions,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Check that an `ffmpeg` binary is on the path.
#[track_caller]
pub(crate) fn check_available() -> AppResult<()> {
    match Command::new("ffmpeg").arg("-version").output() {
        Ok(output) if output.status.success() => Ok(()),
        _ => Err(AppError::ConfigError {
            reason: "FFmpeg not found. Install ffmpeg and make sure it is on PATH.".to_string(),
            location: ErrorLocation::from(Location::caller()),
        }),
    }
}

/// Arguments for encoding `width` x `height` raw RGBA into VP8 WebM.
pub(crate) fn encoder_args(width: u32, height: u32, options: &RecorderOptions) -> Vec<String> {
    [
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{}x{}", width, height),
        "-r",
        &options.frame_rate.to_string(),
        "-i",
        "-",
        "-an",
        "-c:v",
        "libvpx",
        "-b:v",
        &options.video_bits_per_second.to_string(),
        "-deadline",
        "realtime",
        "-cpu-used",
        "8",
        "-f",
        "webm",
        "-",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect()
}

/// Opens one ffmpeg process per recording.
#[derive(Debug)]
pub(crate) struct FfmpegRecorderFactory {
    width: u32,
    height: u32,
}

impl FfmpegRecorderFactory {
    /// Encode frames of a `width` x `height` surface.
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl RecorderFactory for FfmpegRecorderFactory {
    #[instrument(skip(self, feed, events))]
    fn open(
        &mut self,
        feed: FrameFeed,
        options: RecorderOptions,
        events: mpsc::UnboundedSender<RecorderEvent>,
    ) -> CoreResult<Box<dyn Recorder>> {
        let mut child = Command::new("ffmpeg")
            .args(encoder_args(self.width, self.height, &options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| recorder_failed(format!("Failed to start FFmpeg encoder: {}", e)))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(recorder_failed("Failed to capture FFmpeg pipes".to_string()));
        };

        let stopping = Arc::new(AtomicBool::new(false));
        let frame_bytes = self.width as usize * self.height as usize * 4;
        let interval = Duration::from_secs(1) / options.frame_rate.max(1);

        thread::Builder::new()
            .name("ffmpeg-feeder".to_string())
            .spawn({
                let stopping = Arc::clone(&stopping);
                move || feed_frames(feed, stdin, frame_bytes, interval, stopping)
            })
            .map_err(|e| recorder_failed(format!("Failed to spawn feeder thread: {}", e)))?;

        thread::Builder::new()
            .name("ffmpeg-reader".to_string())
            .spawn(move || {
                forward_output(stdout, &events);
                match child.wait() {
                    Ok(status) if !status.success() => {
                        error!(status = %status, "FFmpeg encoder exited with error")
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "Failed to wait for FFmpeg encoder"),
                }
                let _ = events.send(RecorderEvent::Stopped);
            })
            .map_err(|e| recorder_failed(format!("Failed to spawn reader thread: {}", e)))?;

        info!(
            width = self.width,
            height = self.height,
            frame_rate = options.frame_rate,
            bitrate = options.video_bits_per_second,
            "FFmpeg encoder started"
        );

        Ok(Box::new(FfmpegRecorder { stopping }))
    }
}

#[track_caller]
fn recorder_failed(reason: String) -> CaptureError {
    CaptureError::RecorderFailed {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Write the latest surface frame at a fixed rate until stopped. Dropping
/// stdin on return signals EOF to ffmpeg.
fn feed_frames(
    feed: FrameFeed,
    mut stdin: ChildStdin,
    frame_bytes: usize,
    interval: Duration,
    stopping: Arc<AtomicBool>,
) {
    let mut next = Instant::now();
    let mut frames_written: u64 = 0;

    while !stopping.load(Ordering::SeqCst) {
        let frame = feed.borrow().clone();

        if let Some(frame) = frame.filter(|f| f.pixels.len() == frame_bytes) {
            if let Err(e) = stdin.write_all(&frame.pixels) {
                warn!(error = %e, "FFmpeg stdin closed");
                break;
            }
            frames_written += 1;
        }

        next += interval;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            next = now;
        }
    }

    debug!(frames_written, "FFmpeg feeder finished");
}

fn forward_output(mut stdout: ChildStdout, events: &mpsc::UnboundedSender<RecorderEvent>) {
    let mut buffer = vec![0u8; READ_CHUNK_SIZE];
    let mut total: usize = 0;

    loop {
        match stdout.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                total += n;
                // A closed receiver means the session was discarded.
                let _ = events.send(RecorderEvent::DataAvailable(buffer[..n].to_vec()));
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                error!(error = %e, "Failed to read FFmpeg output");
                break;
            }
        }
    }

    debug!(bytes = total, "FFmpeg output drained");
}

/// Handle to a running ffmpeg recording.
pub(crate) struct FfmpegRecorder {
    stopping: Arc<AtomicBool>,
}

impl Recorder for FfmpegRecorder {
    fn stop(&mut self) -> CoreResult<()> {
        self.stopping.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
    }
}
