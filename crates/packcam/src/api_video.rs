//! api.video progressive upload over reqwest.

use std::panic::Location;

use async_trait::async_trait;
use error_location::ErrorLocation;
use packcam_core::{
    CaptureError, CoreResult, RetryPolicy, UploadTicket, UploadTransport, VideoReference,
};
use reqwest::{
    Client,
    header::CONTENT_RANGE,
    multipart::{Form, Part},
};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Video object returned by every accepted part.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiVideoResponse {
    pub(crate) video_id: String,
    #[serde(default)]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) assets: ApiVideoAssets,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct ApiVideoAssets {
    #[serde(default)]
    pub(crate) player: Option<String>,
    #[serde(default)]
    pub(crate) mp4: Option<String>,
}

impl From<ApiVideoResponse> for VideoReference {
    fn from(response: ApiVideoResponse) -> Self {
        VideoReference {
            video_id: response.video_id,
            title: response.title,
            player_url: response.assets.player,
            mp4_url: response.assets.mp4,
        }
    }
}

/// One multipart request of a progressive upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartRequest {
    pub(crate) token: String,
    /// Sent on the request that creates the video.
    pub(crate) name: Option<String>,
    /// Sent on every request after the video exists.
    pub(crate) video_id: Option<String>,
    pub(crate) content_range: String,
}

impl PartRequest {
    /// Request for the next part of `ticket`; `last` closes the upload.
    pub(crate) fn next(ticket: &UploadTicket, last: bool) -> Self {
        let number = ticket.parts_sent + 1;
        let content_range = if last {
            format!("part {number}/{number}")
        } else {
            format!("part {number}/*")
        };

        Self {
            token: ticket.token.clone(),
            name: ticket
                .video_id
                .is_none()
                .then(|| ticket.video_name.clone()),
            video_id: ticket.video_id.clone(),
            content_range,
        }
    }

    fn form(&self, data: Vec<u8>) -> Form {
        let file_name = format!(
            "{}.webm",
            self.name.as_deref().unwrap_or("recording")
        );
        let mut form = Form::new().part("file", Part::bytes(data).file_name(file_name));

        if let Some(name) = &self.name {
            form = form.text("name", name.clone());
        }
        if let Some(video_id) = &self.video_id {
            form = form.text("videoId", video_id.clone());
        }

        form
    }
}

#[track_caller]
fn transport_error(reason: String) -> CaptureError {
    CaptureError::Transport {
        reason,
        location: ErrorLocation::from(Location::caller()),
    }
}

/// [`UploadTransport`] for the api.video upload-token endpoint.
#[derive(Debug, Clone)]
pub(crate) struct ApiVideoTransport {
    client: Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl ApiVideoTransport {
    pub(crate) fn new(client: Client, endpoint: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            retry,
        }
    }

    async fn post(&self, request: &PartRequest, data: Vec<u8>) -> CoreResult<ApiVideoResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("token", request.token.as_str())])
            .header(CONTENT_RANGE, request.content_range.as_str())
            .multipart(request.form(data))
            .send()
            .await
            .map_err(|e| transport_error(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transport_error(format!(
                "Upload rejected with {}: {}",
                status, body
            )));
        }

        response
            .json::<ApiVideoResponse>()
            .await
            .map_err(|e| transport_error(format!("Invalid upload response: {}", e)))
    }

    async fn send(
        &self,
        operation: &str,
        ticket: &mut UploadTicket,
        data: Vec<u8>,
        last: bool,
    ) -> CoreResult<ApiVideoResponse> {
        let request = PartRequest::next(ticket, last);
        let bytes = data.len();
        debug!(
            tracking_code = %ticket.video_name,
            content_range = %request.content_range,
            bytes,
            "Sending upload part"
        );

        let request = &request;
        let data = &data;
        let response = self
            .retry
            .run(operation, move || self.post(request, data.clone()))
            .await?;

        ticket.video_id = Some(response.video_id.clone());
        ticket.parts_sent += 1;

        Ok(response)
    }
}

#[async_trait]
impl UploadTransport for ApiVideoTransport {
    #[instrument(skip(self, ticket, data), fields(tracking_code = %ticket.video_name, bytes = data.len()))]
    async fn upload_part(&self, ticket: &mut UploadTicket, data: Vec<u8>) -> CoreResult<()> {
        self.send("upload_part", ticket, data, false).await?;
        Ok(())
    }

    #[instrument(skip(self, ticket, data), fields(tracking_code = %ticket.video_name, bytes = data.len()))]
    async fn upload_last_part(
        &self,
        ticket: &mut UploadTicket,
        data: Vec<u8>,
    ) -> CoreResult<VideoReference> {
        let response = self.send("upload_last_part", ticket, data, true).await?;
        Ok(response.into())
    }
}
