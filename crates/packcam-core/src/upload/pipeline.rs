//! Two-phase upload of a finished recording.

use crate::{
    CaptureError, CoreResult, Operator, Toast, UploadResult, VideoReference,
    upload::{StatusSink, UploadCredentials, UploadTicket, UploadTransport, split_parts},
};

use std::{mem, panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Progress of one recording through the upload protocol.
#[derive(Debug)]
pub enum UploadPhase {
    /// Nothing sent yet.
    NotStarted,
    /// Bulk part accepted (or empty and skipped).
    PartUploaded,
    /// Last part accepted; the service returned the video.
    Finalized(VideoReference),
    /// A phase failed. Terminal.
    Failed(CaptureError),
}

/// Uploads finished recordings and reports their lifecycle.
pub struct UploadPipeline {
    transport: Arc<dyn UploadTransport>,
    credentials: UploadCredentials,
    status: Arc<dyn StatusSink>,
    min_part_size: usize,
}

impl UploadPipeline {
    /// Create a pipeline over `transport`.
    pub fn new(
        transport: Arc<dyn UploadTransport>,
        credentials: UploadCredentials,
        status: Arc<dyn StatusSink>,
        min_part_size: usize,
    ) -> Self {
        Self {
            transport,
            credentials,
            status,
            min_part_size,
        }
    }

    /// Upload `recording` for `tracking_code`.
    ///
    /// Reports `in_progress = true` once before the first request and
    /// `in_progress = false` with the video on success. A failed phase
    /// raises exactly one toast for that phase and is returned as
    /// [`CaptureError::UploadPartFailed`] or
    /// [`CaptureError::UploadFinalizeFailed`].
    #[instrument(skip(self, operator, recording), fields(bytes = recording.len()))]
    pub async fn upload(
        &self,
        tracking_code: &str,
        operator: &Operator,
        recording: Vec<u8>,
    ) -> CoreResult<UploadResult> {
        if recording.is_empty() {
            error!(tracking_code, "Refusing to upload an empty recording");
            self.status.notify(Toast::finalize_upload_failed());
            return Err(CaptureError::EmptyRecording {
                tracking_code: tracking_code.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut ticket = UploadTicket::new(tracking_code, self.credentials.token_for(operator));
        let (mut bulk, mut last) = split_parts(recording, self.min_part_size);
        let mut phase = UploadPhase::NotStarted;

        self.status
            .handle_uploading_progress(true, tracking_code, None);

        loop {
            phase = match phase {
                UploadPhase::NotStarted => {
                    self.send_bulk(&mut ticket, mem::take(&mut bulk)).await
                }
                UploadPhase::PartUploaded => {
                    self.send_last(&mut ticket, mem::take(&mut last)).await
                }
                UploadPhase::Finalized(video) => {
                    info!(tracking_code, video_id = %video.video_id, "Upload complete");
                    self.status
                        .handle_uploading_progress(false, tracking_code, Some(&video));
                    return Ok(UploadResult {
                        tracking_code: tracking_code.to_string(),
                        video: Some(video),
                    });
                }
                UploadPhase::Failed(e) => return Err(e),
            };
        }
    }

    async fn send_bulk(
        &self,
        ticket: &mut UploadTicket,
        bulk: Vec<u8>,
    ) -> UploadPhase {
        if bulk.is_empty() {
            debug!(tracking_code = %ticket.video_name, "Recording fits in one part, skipping bulk phase");
            return UploadPhase::PartUploaded;
        }

        let bytes = bulk.len();
        match self.transport.upload_part(ticket, bulk).await {
            Ok(()) => {
                debug!(tracking_code = %ticket.video_name, bytes, "Bulk part uploaded");
                UploadPhase::PartUploaded
            }
            Err(e) => {
                error!(tracking_code = %ticket.video_name, error = %e, "Error uploading video parts");
                self.status.notify(Toast::part_upload_failed());
                UploadPhase::Failed(CaptureError::UploadPartFailed {
                    tracking_code: ticket.video_name.clone(),
                    source: Box::new(e),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    async fn send_last(
        &self,
        ticket: &mut UploadTicket,
        last: Vec<u8>,
    ) -> UploadPhase {
        match self.transport.upload_last_part(ticket, last).await {
            Ok(video) => UploadPhase::Finalized(video),
            Err(e) => {
                error!(tracking_code = %ticket.video_name, error = %e, "Error uploading video");
                self.status.notify(Toast::finalize_upload_failed());
                UploadPhase::Failed(CaptureError::UploadFinalizeFailed {
                    tracking_code: ticket.video_name.clone(),
                    source: Box::new(e),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }
}
