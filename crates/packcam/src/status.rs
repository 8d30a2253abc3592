//! Station-facing status: logs, desktop notifications and events for the
//! station loop.

use crate::StationEvent;

use std::thread;

use notify_rust::Notification;
use packcam_core::{StatusSink, Toast, ToastVariant, UploadResult, VideoReference};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const APP_NAME: &str = "Packcam";

/// [`StatusSink`] that forwards every callback to the station loop and
/// raises toasts as desktop notifications.
pub(crate) struct DesktopStatus {
    events: mpsc::UnboundedSender<StationEvent>,
    notifications: bool,
}

impl DesktopStatus {
    pub(crate) fn new(events: mpsc::UnboundedSender<StationEvent>, notifications: bool) -> Self {
        Self {
            events,
            notifications,
        }
    }

    fn forward(&self, event: StationEvent) {
        if self.events.send(event).is_err() {
            warn!("Station loop is gone, status event dropped");
        }
    }
}

impl StatusSink for DesktopStatus {
    fn handle_stream(&self, active: bool) {
        if active {
            info!("Camera ready, scanning enabled");
        } else {
            warn!("Camera unavailable, scanning disabled");
        }
        self.forward(StationEvent::Stream(active));
    }

    fn handle_uploading_progress(
        &self,
        in_progress: bool,
        tracking_code: &str,
        video: Option<&VideoReference>,
    ) {
        if in_progress {
            info!(tracking_code, "Upload started");
            self.forward(StationEvent::UploadStarted {
                tracking_code: tracking_code.to_string(),
            });
        } else {
            info!(tracking_code, video = ?video, "Upload finished");
            self.forward(StationEvent::UploadFinished(UploadResult {
                tracking_code: tracking_code.to_string(),
                video: video.cloned(),
            }));
        }
    }

    fn notify(&self, toast: Toast) {
        match toast.variant {
            ToastVariant::Destructive => error!(title = %toast.title, "{}", toast.description),
            ToastVariant::Default => info!(title = %toast.title, "{}", toast.description),
        }

        if self.notifications {
            let summary = toast.title.clone();
            let body = toast.description.clone();
            // Showing blocks on the notification daemon.
            let spawned = thread::Builder::new()
                .name("notification".to_string())
                .spawn(move || {
                    if let Err(e) = Notification::new()
                        .appname(APP_NAME)
                        .summary(&summary)
                        .body(&body)
                        .show()
                    {
                        warn!(error = %e, "Failed to show desktop notification");
                    }
                });
            if let Err(e) = spawned {
                warn!(error = %e, "Failed to spawn notification thread");
            }
        }

        self.forward(StationEvent::Toast(toast));
    }
}
