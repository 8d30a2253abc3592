use crate::{CoreResult, VideoReference};

use async_trait::async_trait;

/// Per-recording upload state shared between the two phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    /// Name the video is ingested under (the tracking code).
    pub video_name: String,
    /// Upload token for the operator's tier.
    pub token: String,
    /// Identifier assigned by the service after the first part.
    pub video_id: Option<String>,
    /// Parts accepted so far.
    pub parts_sent: u32,
}

impl UploadTicket {
    /// Fresh ticket for a recording.
    pub fn new(video_name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            video_name: video_name.into(),
            token: token.into(),
            video_id: None,
            parts_sent: 0,
        }
    }
}

/// Two-phase part upload offered by the media-ingestion service.
///
/// Implementations apply their own retry policy to each request.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Upload an intermediate part.
    async fn upload_part(&self, ticket: &mut UploadTicket, data: Vec<u8>) -> CoreResult<()>;

    /// Upload the final part and return the ingested video.
    async fn upload_last_part(
        &self,
        ticket: &mut UploadTicket,
        data: Vec<u8>,
    ) -> CoreResult<VideoReference>;
}
