mod backend_config;
mod behaviour_config;
mod camera_config;
#[allow(clippy::module_inception)]
mod config;
mod operator_config;
mod overlay_config;
mod upload_config;

pub(crate) use {
    backend_config::BackendConfig, behaviour_config::BehaviourConfig,
    camera_config::CameraConfig, config::Config, operator_config::OperatorConfig,
    overlay_config::OverlayConfig, upload_config::UploadConfig,
};

pub(crate) const DEFAULT_IDEAL_WIDTH: u32 = 1280;
pub(crate) const DEFAULT_IDEAL_HEIGHT: u32 = 960;
pub(crate) const DEFAULT_MIN_DIMENSION: u32 = 480;
pub(crate) const DEFAULT_MAX_WIDTH: u32 = 1920;
pub(crate) const DEFAULT_MAX_HEIGHT: u32 = 1080;
pub(crate) const DEFAULT_FRAME_RATE: u32 = 30;

pub(crate) const DEFAULT_SURFACE_WIDTH: u32 = 1280;
pub(crate) const DEFAULT_SURFACE_HEIGHT: u32 = 960;
pub(crate) const DEFAULT_FONT_FILE: &str = "DejaVuSansMono-Bold.ttf";
pub(crate) const DEFAULT_WATERMARK_FONT_FILE: &str = "DejaVuSans-Bold.ttf";

pub(crate) const DEFAULT_UPLOAD_ENDPOINT: &str = "https://ws.api.video/upload";
pub(crate) const DEFAULT_RETRIES: u32 = 5;
pub(crate) const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
pub(crate) const DEFAULT_VIDEO_BITRATE: u64 = 3 * 1024 * 1024;

pub(crate) const DEFAULT_BACKEND_URL: &str = "http://localhost:1337";
pub(crate) const DEFAULT_SAVE_TO_LOCAL: bool = false;
pub(crate) const DEFAULT_USER_ID: u64 = 1;

pub(crate) const UPLOAD_TOKEN_ENV: &str = "PACKCAM_UPLOAD_TOKEN";
pub(crate) const TRIAL_UPLOAD_TOKEN_ENV: &str = "PACKCAM_TRIAL_UPLOAD_TOKEN";
pub(crate) const BACKEND_TOKEN_ENV: &str = "PACKCAM_BACKEND_TOKEN";

pub(crate) fn default_ideal_width() -> u32 {
    DEFAULT_IDEAL_WIDTH
}

pub(crate) fn default_ideal_height() -> u32 {
    DEFAULT_IDEAL_HEIGHT
}

pub(crate) fn default_min_dimension() -> u32 {
    DEFAULT_MIN_DIMENSION
}

pub(crate) fn default_max_width() -> u32 {
    DEFAULT_MAX_WIDTH
}

pub(crate) fn default_max_height() -> u32 {
    DEFAULT_MAX_HEIGHT
}

pub(crate) fn default_frame_rate() -> u32 {
    DEFAULT_FRAME_RATE
}

pub(crate) fn default_surface_width() -> u32 {
    DEFAULT_SURFACE_WIDTH
}

pub(crate) fn default_surface_height() -> u32 {
    DEFAULT_SURFACE_HEIGHT
}

pub(crate) fn default_watermark_text() -> String {
    packcam_core::DEFAULT_WATERMARK_TEXT.to_string()
}

pub(crate) fn default_upload_endpoint() -> String {
    DEFAULT_UPLOAD_ENDPOINT.to_string()
}

pub(crate) fn default_min_part_size() -> usize {
    packcam_core::DEFAULT_MIN_PART_SIZE
}

pub(crate) fn default_retries() -> u32 {
    DEFAULT_RETRIES
}

pub(crate) fn default_retry_delay_secs() -> u64 {
    DEFAULT_RETRY_DELAY_SECS
}

pub(crate) fn default_video_bitrate() -> u64 {
    DEFAULT_VIDEO_BITRATE
}

pub(crate) fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

pub(crate) fn default_save_to_local() -> bool {
    DEFAULT_SAVE_TO_LOCAL
}

pub(crate) fn default_user_id() -> u64 {
    DEFAULT_USER_ID
}
