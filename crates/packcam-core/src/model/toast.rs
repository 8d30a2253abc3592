/// Visual weight of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    /// Informational.
    Default,
    /// Something failed and the operator should act.
    Destructive,
}

/// User-visible notification raised by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Short headline.
    pub title: String,
    /// Follow-up instruction for the operator.
    pub description: String,
    /// Visual weight.
    pub variant: ToastVariant,
}

impl Toast {
    /// Raised when the bulk part upload fails.
    pub fn part_upload_failed() -> Self {
        Self {
            title: "Error enumerating video devices".to_string(),
            description: "Please check your camera and try again.".to_string(),
            variant: ToastVariant::Destructive,
        }
    }

    /// Raised when the last part upload fails.
    pub fn finalize_upload_failed() -> Self {
        Self {
            title: "Error uploading video".to_string(),
            description: "Please try again.".to_string(),
            variant: ToastVariant::Destructive,
        }
    }

    /// Raised when a recorder cannot be opened for a new session.
    pub fn recording_failed() -> Self {
        Self {
            title: "Error starting recording".to_string(),
            description: "Please reselect the camera and scan again.".to_string(),
            variant: ToastVariant::Destructive,
        }
    }
}
