use crate::config::{
    DEFAULT_FRAME_RATE, DEFAULT_IDEAL_HEIGHT, DEFAULT_IDEAL_WIDTH, DEFAULT_MAX_HEIGHT,
    DEFAULT_MAX_WIDTH, DEFAULT_MIN_DIMENSION, default_frame_rate, default_ideal_height,
    default_ideal_width, default_max_height, default_max_width, default_min_dimension,
};

use packcam_core::StreamConstraints;
use serde::{Deserialize, Serialize};

/// Camera device and requested format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Device selected at start-up (None = wait for `device <id>`).
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,
    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,
    #[serde(default = "default_min_dimension")]
    pub min_width: u32,
    #[serde(default = "default_min_dimension")]
    pub min_height: u32,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    /// Camera and encoder frame rate.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_id: None,
            ideal_width: DEFAULT_IDEAL_WIDTH,
            ideal_height: DEFAULT_IDEAL_HEIGHT,
            min_width: DEFAULT_MIN_DIMENSION,
            min_height: DEFAULT_MIN_DIMENSION,
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }
}

impl CameraConfig {
    pub fn constraints(&self) -> StreamConstraints {
        StreamConstraints {
            ideal_width: self.ideal_width,
            ideal_height: self.ideal_height,
            min_width: self.min_width,
            min_height: self.min_height,
            max_width: self.max_width,
            max_height: self.max_height,
            ideal_frame_rate: self.frame_rate,
        }
    }
}
