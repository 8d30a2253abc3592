use crate::{Toast, VideoReference};

/// Callbacks through which the station observes the recorder.
pub trait StatusSink: Send + Sync {
    /// Camera stream became ready (`true`) or could not be acquired.
    fn handle_stream(&self, active: bool);

    /// Upload lifecycle: `true` while uploading, `false` with the video once
    /// ingested.
    fn handle_uploading_progress(
        &self,
        in_progress: bool,
        tracking_code: &str,
        video: Option<&VideoReference>,
    );

    /// Show a user-visible notification.
    fn notify(&self, toast: Toast);
}
