use serde::{Deserialize, Serialize};

/// Reference to a video ingested by the media service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoReference {
    /// Media service identifier.
    pub video_id: String,
    /// Title the video was stored under.
    #[serde(default)]
    pub title: String,
    /// Embeddable player URL.
    #[serde(default)]
    pub player_url: Option<String>,
    /// Direct MP4 URL.
    #[serde(default)]
    pub mp4_url: Option<String>,
}

impl VideoReference {
    /// Best URL to attach to a transaction log entry.
    pub fn url(&self) -> Option<&str> {
        self.player_url.as_deref().or(self.mp4_url.as_deref())
    }
}

/// Produced once per completed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    /// Tracking code the recording belongs to.
    pub tracking_code: String,
    /// Ingested video, absent when the upload failed.
    pub video: Option<VideoReference>,
}
