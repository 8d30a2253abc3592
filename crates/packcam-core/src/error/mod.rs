use error_location::ErrorLocation;
use thiserror::Error;

/// Capture, compositing and upload errors with source location tracking.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Camera stream could not be acquired (permission denied, device
    /// missing, or no format within the requested bounds).
    #[error("Stream unavailable for device {device_id:?}: {reason} {location}")]
    StreamUnavailable {
        /// Device the stream was requested from.
        device_id: String,
        /// Description of the acquisition failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Drawing surface could not be prepared or captured.
    #[error("Drawing surface unavailable: {reason} {location}")]
    SurfaceUnavailable {
        /// Description of the surface failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recorder could not be opened or stopped.
    #[error("Recorder error: {reason} {location}")]
    RecorderFailed {
        /// Description of the recorder failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The intermediate part upload failed.
    #[error("Part upload failed for {tracking_code}: {source} {location}")]
    UploadPartFailed {
        /// Tracking code of the recording being uploaded.
        tracking_code: String,
        /// Underlying transport error.
        #[source]
        source: Box<CaptureError>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The finalizing last-part upload failed.
    #[error("Last part upload failed for {tracking_code}: {source} {location}")]
    UploadFinalizeFailed {
        /// Tracking code of the recording being uploaded.
        tracking_code: String,
        /// Underlying transport error.
        #[source]
        source: Box<CaptureError>,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Transport-level failure (network, HTTP status, malformed response).
    #[error("Upload transport error: {reason} {location}")]
    Transport {
        /// Description of the transport failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the local copy of a recording failed.
    #[error("Failed to save {file_name} locally: {source} {location}")]
    LocalSaveFailed {
        /// File name that was being written.
        file_name: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Recorder finalized without producing any data.
    #[error("Recording for {tracking_code} is empty {location}")]
    EmptyRecording {
        /// Tracking code of the empty recording.
        tracking_code: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`CaptureError`].
pub type Result<T> = std::result::Result<T, CaptureError>;
