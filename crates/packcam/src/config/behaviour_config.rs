use crate::config::default_save_to_local;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether to keep a local copy of every recording.
    #[serde(default = "default_save_to_local")]
    pub save_to_local: bool,
    /// Where local copies go (None = the user's download folder).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}
