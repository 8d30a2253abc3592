use crate::config::{
    DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_SECS, DEFAULT_VIDEO_BITRATE, default_min_part_size,
    default_retries, default_retry_delay_secs, default_upload_endpoint, default_video_bitrate,
};

use std::time::Duration;

use packcam_core::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Media service upload settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Progressive upload endpoint.
    #[serde(default = "default_upload_endpoint")]
    pub endpoint: String,
    /// Smallest non-final part in bytes.
    #[serde(default = "default_min_part_size")]
    pub min_part_size: usize,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
    /// Encoder target in bits per second.
    #[serde(default = "default_video_bitrate")]
    pub video_bitrate: u64,
    /// Upload token for full accounts. `PACKCAM_UPLOAD_TOKEN` wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Upload token for trial accounts. `PACKCAM_TRIAL_UPLOAD_TOKEN` wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_token: Option<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: default_upload_endpoint(),
            min_part_size: default_min_part_size(),
            retries: DEFAULT_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            video_bitrate: DEFAULT_VIDEO_BITRATE,
            token: None,
            trial_token: None,
        }
    }
}

impl UploadConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries,
            delay: Duration::from_secs(self.retry_delay_secs),
        }
    }
}

// Tokens never reach the logs.
impl std::fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadConfig")
            .field("endpoint", &self.endpoint)
            .field("min_part_size", &self.min_part_size)
            .field("retries", &self.retries)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("video_bitrate", &self.video_bitrate)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("trial_token", &self.trial_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
