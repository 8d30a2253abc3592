//! Client for the `/api/wms-logs` transaction-log collection.

use crate::{AppError, AppResult, config::BackendConfig};

use std::panic::Location;

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument};

const SUB_DOMAIN: &str = "/api/wms-logs";

/// Body of a new packing transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NewWmsLog {
    pub(crate) organization: u64,
    pub(crate) transaction: String,
    #[serde(rename = "type")]
    pub(crate) kind: String,
    pub(crate) status: String,
    pub(crate) user: u64,
}

impl NewWmsLog {
    /// Outbound parcel packed by `user`.
    pub(crate) fn packed(organization: u64, transaction: impl Into<String>, user: u64) -> Self {
        Self {
            organization,
            transaction: transaction.into(),
            kind: "outbound".to_string(),
            status: "packed".to_string(),
            user,
        }
    }
}

/// A stored transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct WmsLog {
    pub(crate) id: u64,
    pub(crate) attributes: WmsLogAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WmsLogAttributes {
    #[serde(default)]
    pub(crate) transaction: String,
    #[serde(default)]
    pub(crate) created_at: Option<String>,
    #[serde(default)]
    pub(crate) video_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoUrlUpdate<'a> {
    video_url: &'a str,
}

/// Transaction-log persistence used by the station.
#[async_trait]
pub(crate) trait LogStore: Send + Sync {
    /// Create a log and return it as stored.
    async fn create(&self, log: &NewWmsLog) -> AppResult<WmsLog>;

    /// Attach the uploaded video to log `id`.
    async fn attach_video(&self, id: u64, video_url: &str) -> AppResult<()>;

    /// Delete log `id` and return it.
    async fn delete(&self, id: u64) -> AppResult<WmsLog>;
}

/// [`LogStore`] over the backend REST API.
#[derive(Debug, Clone)]
pub(crate) struct WmsLogsClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl WmsLogsClient {
    pub(crate) fn new(client: Client, config: &BackendConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    fn url(&self, id: Option<u64>) -> String {
        match id {
            Some(id) => format!("{}{}/{}", self.base_url, SUB_DOMAIN, id),
            None => format!("{}{}", self.base_url, SUB_DOMAIN),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    #[track_caller]
    fn rejected(status: reqwest::StatusCode, body: String) -> AppError {
        AppError::BackendError {
            reason: format!("Backend rejected request with {}: {}", status, body),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    async fn read<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::rejected(status, body));
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl LogStore for WmsLogsClient {
    #[instrument(skip(self, log), fields(transaction = %log.transaction))]
    async fn create(&self, log: &NewWmsLog) -> AppResult<WmsLog> {
        let response = self
            .authorize(self.client.post(self.url(None)))
            .json(&Envelope { data: log })
            .send()
            .await?;

        let created: WmsLog = Self::read(response).await?;
        info!(id = created.id, "Transaction log created");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn attach_video(&self, id: u64, video_url: &str) -> AppResult<()> {
        let response = self
            .authorize(self.client.put(self.url(Some(id))))
            .json(&Envelope {
                data: VideoUrlUpdate { video_url },
            })
            .send()
            .await?;

        let _: serde_json::Value = Self::read(response).await?;
        debug!(id, "Video attached to transaction log");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: u64) -> AppResult<WmsLog> {
        let response = self
            .authorize(self.client.delete(self.url(Some(id))))
            .send()
            .await?;

        let deleted: WmsLog = Self::read(response).await?;
        info!(id, transaction = %deleted.attributes.transaction, "Transaction log deleted");
        Ok(deleted)
    }
}
