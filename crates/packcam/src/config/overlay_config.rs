use crate::config::{
    DEFAULT_FONT_FILE, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH,
    DEFAULT_WATERMARK_FONT_FILE, default_surface_height, default_surface_width,
    default_watermark_text,
};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Overlay fonts and compositing surface size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Bold monospace face for the annotations.
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,
    /// Bold sans-serif face for the trial watermark.
    #[serde(default = "default_watermark_font_path")]
    pub watermark_font_path: PathBuf,
    #[serde(default = "default_watermark_text")]
    pub watermark_text: String,
    #[serde(default = "default_surface_width")]
    pub surface_width: u32,
    #[serde(default = "default_surface_height")]
    pub surface_height: u32,
}

fn default_font_path() -> PathBuf {
    PathBuf::from(DEFAULT_FONT_FILE)
}

fn default_watermark_font_path() -> PathBuf {
    PathBuf::from(DEFAULT_WATERMARK_FONT_FILE)
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            watermark_font_path: default_watermark_font_path(),
            watermark_text: default_watermark_text(),
            surface_width: DEFAULT_SURFACE_WIDTH,
            surface_height: DEFAULT_SURFACE_HEIGHT,
        }
    }
}
