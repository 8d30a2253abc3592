mod credentials;
mod parts;
mod pipeline;
mod retry;
mod status;
mod transport;

pub(crate) use parts::split_parts;

pub use {
    credentials::UploadCredentials,
    pipeline::{UploadPhase, UploadPipeline},
    retry::RetryPolicy,
    status::StatusSink,
    transport::{UploadTicket, UploadTransport},
};

/// Smallest non-final part the media service accepts.
pub const DEFAULT_MIN_PART_SIZE: usize = 5 * 1024 * 1024;
