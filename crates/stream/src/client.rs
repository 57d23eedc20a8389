//! HTTP client for the Cloudflare Stream API, using [`reqwest`].

use std::time::Duration;

use reelmeta_core::status::UploadStatus;
use serde::Deserialize;

use crate::config::StreamConfig;
use crate::error::StreamError;

/// Host serving thumbnails and raw playback.
const DELIVERY_HOST: &str = "videodelivery.net";
/// Host serving the embeddable player.
const IFRAME_HOST: &str = "iframe.videodelivery.net";

/// Default thumbnail frame position, as a fraction of the duration.
const THUMBNAIL_TIMESTAMP_PCT: f64 = 0.1;

/// Thumbnail URL for a video uid. `time_pct`, when given, selects the
/// frame at that fraction of the duration instead of the default.
pub fn thumbnail_url(uid: &str, time_pct: Option<f64>) -> String {
    match time_pct {
        Some(pct) => format!("https://{DELIVERY_HOST}/{uid}/thumbnails/thumbnail.jpg?time={pct}s"),
        None => format!("https://{DELIVERY_HOST}/{uid}/thumbnails/thumbnail.jpg"),
    }
}

/// Embeddable player URL for a video uid.
pub fn stream_url(uid: &str) -> String {
    format!("https://{IFRAME_HOST}/{uid}")
}

/// Response envelope shared by all Stream API endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<T>,
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

/// Result of a direct-upload handshake.
#[derive(Debug, Deserialize)]
pub struct DirectUpload {
    /// One-time URL the file bytes are posted to.
    #[serde(rename = "uploadURL")]
    pub upload_url: String,
    /// Provider-assigned video identifier.
    pub uid: String,
}

/// Provider-side state of a video.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoDetails {
    pub uid: String,
    #[serde(rename = "readyToStream", default)]
    pub ready_to_stream: bool,
    pub status: VideoState,
    pub duration: Option<f64>,
    /// Stored file size in bytes, once the provider has it.
    pub size: Option<u64>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoState {
    pub state: String,
}

impl VideoDetails {
    /// Map the provider state onto the stored upload status.
    pub fn upload_status(&self) -> UploadStatus {
        match self.status.state.as_str() {
            "ready" => UploadStatus::Complete,
            "error" => UploadStatus::Error,
            "pendingupload" => UploadStatus::Pending,
            _ => UploadStatus::Processing,
        }
    }
}

/// HTTP client bound to one Cloudflare account.
pub struct StreamClient {
    client: reqwest::Client,
    config: StreamConfig,
}

impl StreamClient {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: StreamConfig) -> Self {
        Self { client, config }
    }

    fn stream_base(&self) -> String {
        format!(
            "{}/accounts/{}/stream",
            self.config.api_base, self.config.account_id
        )
    }

    /// Request a one-time direct-upload URL for a new video.
    pub async fn direct_upload(&self, name: &str) -> Result<DirectUpload, StreamError> {
        let body = serde_json::json!({
            "maxDurationSeconds": self.config.max_duration_seconds,
            "requireSignedURLs": false,
            "allowedOrigins": [],
            "thumbnailTimestampPct": THUMBNAIL_TIMESTAMP_PCT,
            "meta": { "name": name },
        });

        let response = self
            .client
            .post(format!("{}/direct_upload", self.stream_base()))
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    /// Upload a video: handshake for a direct-upload URL, then post the
    /// file bytes to it. Returns the provider uid.
    pub async fn upload_video(
        &self,
        name: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StreamError> {
        let handshake = self.direct_upload(name).await?;
        tracing::debug!(uid = %handshake.uid, "direct upload URL issued");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        // The upload URL is pre-authorized; no bearer token here.
        let response = self
            .client
            .post(&handshake.upload_url)
            .multipart(form)
            .send()
            .await?;
        Self::check_status(response).await?;

        Ok(handshake.uid)
    }

    /// Fetch the current provider-side state of a video.
    pub async fn video_details(&self, uid: &str) -> Result<VideoDetails, StreamError> {
        let response = self
            .client
            .get(format!("{}/{}", self.stream_base(), uid))
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;

        Self::unwrap_envelope(response).await
    }

    /// Update the display name stored with the video.
    pub async fn update_metadata(&self, uid: &str, name: &str) -> Result<(), StreamError> {
        let body = serde_json::json!({ "meta": { "name": name } });
        let response = self
            .client
            .post(format!("{}/{}", self.stream_base(), uid))
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Delete a video from the provider.
    pub async fn delete_video(&self, uid: &str) -> Result<(), StreamError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.stream_base(), uid))
            .bearer_auth(&self.config.api_token)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Poll until the video is ready to stream.
    ///
    /// Always polls at least once; the elapsed check runs after each
    /// poll, so `max_wait` of zero means exactly one status fetch. A
    /// provider-side `error` state fails immediately; exhausting the
    /// window yields [`StreamError::Timeout`], which is inconclusive
    /// rather than a hard failure.
    pub async fn wait_for_processing(
        &self,
        uid: &str,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> Result<VideoDetails, StreamError> {
        let start = tokio::time::Instant::now();
        loop {
            let details = self.video_details(uid).await?;
            if details.ready_to_stream || details.status.state == "ready" {
                return Ok(details);
            }
            if details.status.state == "error" {
                return Err(StreamError::Provider(format!(
                    "video {uid} failed processing"
                )));
            }
            if start.elapsed() >= max_wait {
                return Err(StreamError::Timeout {
                    uid: uid.to_string(),
                    waited_secs: start.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// Upload a video and wait for it to finish processing.
    ///
    /// On a hard processing failure the uploaded video is deleted so
    /// the provider is not left holding a broken asset. A timeout is
    /// inconclusive, not a failure: the upload is kept and `None` is
    /// returned for the details so the caller can refresh the status
    /// later.
    pub async fn upload_and_wait(
        &self,
        name: &str,
        file_name: &str,
        bytes: Vec<u8>,
        max_wait: Duration,
        poll_interval: Duration,
    ) -> Result<(String, Option<VideoDetails>), StreamError> {
        let uid = self.upload_video(name, file_name, bytes).await?;

        match self.wait_for_processing(&uid, max_wait, poll_interval).await {
            Ok(details) => Ok((uid, Some(details))),
            Err(StreamError::Timeout { waited_secs, .. }) => {
                tracing::info!(uid = %uid, waited_secs, "still processing, keeping upload");
                Ok((uid, None))
            }
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "processing failed, deleting upload");
                if let Err(cleanup) = self.delete_video(&uid).await {
                    tracing::warn!(uid = %uid, error = %cleanup, "cleanup delete failed");
                }
                Err(err)
            }
        }
    }

    // ---- private helpers ----

    /// Ensure a success status code, returning the response unchanged.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StreamError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(StreamError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a Stream envelope, rejecting `success: false` bodies.
    async fn unwrap_envelope<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StreamError> {
        let response = Self::ensure_success(response).await?;
        let envelope = response.json::<Envelope<T>>().await?;
        if !envelope.success {
            let detail = envelope
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(StreamError::Provider(detail));
        }
        envelope
            .result
            .ok_or_else(|| StreamError::Provider("response envelope missing result".to_string()))
    }

    /// Assert a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), StreamError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
