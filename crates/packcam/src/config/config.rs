//! Configuration management for packcam.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, environment overrides for secrets, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        BACKEND_TOKEN_ENV, BackendConfig, BehaviourConfig, CameraConfig, DEFAULT_FONT_FILE,
        DEFAULT_WATERMARK_FONT_FILE, OperatorConfig, OverlayConfig, TRIAL_UPLOAD_TOKEN_ENV,
        UPLOAD_TOKEN_ENV, UploadConfig,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::{ProjectDirs, UserDirs};
use error_location::ErrorLocation;
use packcam_core::{CaptureSettings, RecorderOptions, UploadCredentials};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Camera device and format.
    #[serde(default)]
    pub camera: CameraConfig,
    /// Overlay fonts and surface.
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Media service upload.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Transaction-log backend.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Application behavior settings.
    #[serde(default)]
    pub behaviour: BehaviourConfig,
    /// Signed-in operator.
    #[serde(default)]
    pub operator: OperatorConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found, then
    /// apply the environment overrides.
    ///
    /// Fonts and tokens are NOT validated here. Call `validate_fonts()` and
    /// `upload_credentials()` before building the capture stack.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path).map_err(|e| AppError::ConfigError {
                reason: format!("Failed to read config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

            let config = Self::parse(&contents)?;
            info!(config_path = ?config_path, "Configuration loaded");
            config
        } else {
            info!("No config found, creating default");
            Self::create_default()?
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Parse TOML contents. Missing sections and fields take their defaults.
    #[track_caller]
    pub fn parse(contents: &str) -> AppResult<Self> {
        toml::from_str(contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Replace secrets with the values `lookup` finds in the environment.
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(token) = env(UPLOAD_TOKEN_ENV) {
            debug!(key = UPLOAD_TOKEN_ENV, "Upload token taken from environment");
            self.upload.token = Some(token);
        }
        if let Some(token) = env(TRIAL_UPLOAD_TOKEN_ENV) {
            debug!(key = TRIAL_UPLOAD_TOKEN_ENV, "Trial upload token taken from environment");
            self.upload.trial_token = Some(token);
        }
        if let Some(token) = env(BACKEND_TOKEN_ENV) {
            debug!(key = BACKEND_TOKEN_ENV, "Backend token taken from environment");
            self.backend.api_token = Some(token);
        }
    }

    /// Upload tokens for both tiers.
    ///
    /// The token of the operator's tier is required; the other may be absent.
    #[track_caller]
    pub fn upload_credentials(&self) -> AppResult<UploadCredentials> {
        let (required, env_key) = if self.operator.is_trial {
            (&self.upload.trial_token, TRIAL_UPLOAD_TOKEN_ENV)
        } else {
            (&self.upload.token, UPLOAD_TOKEN_ENV)
        };

        if required.as_deref().is_none_or(str::is_empty) {
            return Err(AppError::ConfigError {
                reason: format!(
                    "No upload token for {} operators. Set {} or the [upload] section.",
                    if self.operator.is_trial { "trial" } else { "standard" },
                    env_key
                ),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(UploadCredentials::new(
            self.upload.token.clone().unwrap_or_default(),
            self.upload.trial_token.clone().unwrap_or_default(),
        ))
    }

    /// Validate that both overlay fonts exist.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn validate_fonts(&self) -> AppResult<()> {
        for path in [&self.overlay.font_path, &self.overlay.watermark_font_path] {
            if !path.exists() {
                return Err(AppError::ConfigError {
                    reason: format!(
                        "Font not found at: {:?}. Install the font or configure the path in the [overlay] section.",
                        path
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
        Ok(())
    }

    /// Controller tunables derived from the camera and upload sections.
    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            constraints: self.camera.constraints(),
            recorder: RecorderOptions {
                frame_rate: self.camera.frame_rate,
                video_bits_per_second: self.upload.video_bitrate,
            },
            ..CaptureSettings::default()
        }
    }

    /// Directory for local copies: the configured one, else the user's
    /// download folder, else the data dir.
    #[track_caller]
    pub fn download_dir(&self) -> AppResult<PathBuf> {
        if let Some(dir) = &self.behaviour.download_dir {
            return Ok(dir.clone());
        }

        if let Some(dir) = UserDirs::new().and_then(|u| u.download_dir().map(Path::to_path_buf)) {
            return Ok(dir);
        }

        Ok(Self::project_dirs()?.data_dir().join("recordings"))
    }

    /// Directory for the rolling JSON log files.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("logs"))
    }

    /// Save configuration to disk using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument]
    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_path()?;

        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = config_path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, &config_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?config_path, "Configuration saved (atomic write)");

        Ok(())
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "swifthub", "Packcam").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }

    #[track_caller]
    fn create_default() -> AppResult<Self> {
        let fonts_dir = Self::project_dirs()?.data_dir().join("fonts");

        let config = Config {
            overlay: OverlayConfig {
                font_path: fonts_dir.join(DEFAULT_FONT_FILE),
                watermark_font_path: fonts_dir.join(DEFAULT_WATERMARK_FONT_FILE),
                ..OverlayConfig::default()
            },
            ..Config::default()
        };

        config.save()?;

        warn!(
            fonts_dir = ?fonts_dir,
            "Default config created. Overlay fonts and the operator must be configured before recording."
        );

        Ok(config)
    }
}
