use std::{
    fs,
    io::{self, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use packcam_core::{CaptureError, CoreResult, LocalSink};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Saves recordings into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub(crate) struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Reduce `file_name` to a single path component inside the sink directory.
///
/// Path separators and control characters become `_` and leading dots are
/// dropped, so scanned codes like `../x` or `/tmp/x` stay in the directory.
pub(crate) fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match cleaned.trim_start_matches('.') {
        "" => "recording.webm".to_string(),
        name => name.to_string(),
    }
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

impl LocalSink for DirectorySink {
    /// Atomic write: temp file then rename, so a crash never leaves a
    /// truncated `.webm` behind. A failed write removes the temp file.
    #[track_caller]
    #[instrument(skip(self, data), fields(bytes = data.len()))]
    fn save(&self, file_name: &str, data: &[u8]) -> CoreResult<()> {
        let file_name = sanitize_file_name(file_name);
        let failed = |source: io::Error| CaptureError::LocalSaveFailed {
            file_name: file_name.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        };

        fs::create_dir_all(&self.dir).map_err(failed)?;

        let path = self.dir.join(&file_name);
        let temp_path = self.dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let written = write_synced(&temp_path, data).and_then(|()| fs::rename(&temp_path, &path));
        if let Err(e) = written {
            match fs::remove_file(&temp_path) {
                Err(cleanup) if cleanup.kind() != io::ErrorKind::NotFound => {
                    warn!(path = ?temp_path, error = %cleanup, "Failed to remove temp recording")
                }
                _ => {}
            }
            return Err(failed(e));
        }

        info!(path = ?path, "Recording written");

        Ok(())
    }
}
