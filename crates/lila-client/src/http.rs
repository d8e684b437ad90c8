//! reqwest implementation of the chat backend

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use lila_config::BackendConfig;
use lila_core::{
    Attachment, ByteStream, ChatBackend, ChatRequest, FileReference, TransportError, TurnError,
    TurnResult,
};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

const ANALYSIS_FAILED: &str = "Analysis failed";

/// HTTP client for the relay backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    chat_url: String,
    upload_url: String,
    analyze_url: String,
    health_url: String,
    timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpBackend {
    /// Create a backend for the endpoints in `config`
    ///
    /// The configured timeout bounds connection setup for every request and
    /// the whole exchange for upload, analysis and health probes. A chat
    /// stream may run for as long as the backend keeps it open.
    pub fn new(config: &BackendConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(network)?;

        Ok(Self {
            client,
            chat_url: config.chat_url(),
            upload_url: config.upload_url(),
            analyze_url: config.analyze_url(),
            health_url: config.health_url(),
            timeout: config.timeout(),
        })
    }

    fn bounded(&self, request: RequestBuilder) -> RequestBuilder {
        match self.timeout {
            Some(timeout) => request.timeout(timeout),
            None => request,
        }
    }

    fn file_part(attachment: &Attachment) -> TurnResult<Part> {
        Part::bytes(attachment.bytes().to_vec())
            .file_name(attachment.name().to_string())
            .mime_str(attachment.mime_type())
            .map_err(|e| TurnError::Transport(network(e)))
    }
}

fn network(err: reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

/// Turn a non-success response into the error shown to the user
///
/// A JSON body carrying `error` is the backend's own message and is used
/// verbatim; anything else is reported as the HTTP status.
async fn failure(response: Response, fallback: Option<&str>) -> TurnError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = status.as_u16(), body = %body, "backend returned an error status");

    if let Ok(ErrorBody { error: Some(message) }) = serde_json::from_str::<ErrorBody>(&body) {
        return TurnError::Backend(message);
    }
    if let Some(fallback) = fallback {
        return TurnError::Backend(fallback.to_string());
    }
    TurnError::Transport(TransportError::Status {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
    })
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn upload(&self, attachment: &Attachment, user: &str) -> TurnResult<FileReference> {
        let form = Form::new()
            .part("file", Self::file_part(attachment)?)
            .text("user", user.to_string());

        let response = self
            .bounded(self.client.post(&self.upload_url).multipart(form))
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(failure(response, None).await);
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Body(format!("invalid upload response: {}", e)))?;
        info!(file_id = %body.id, "file uploaded");
        Ok(FileReference(body.id))
    }

    async fn analyze(&self, attachment: &Attachment) -> TurnResult<String> {
        let form = Form::new().part("file", Self::file_part(attachment)?);

        let response = self
            .bounded(self.client.post(&self.analyze_url).multipart(form))
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(failure(response, Some(ANALYSIS_FAILED)).await);
        }

        let report = response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        debug!(chars = report.len(), "analysis report received");
        Ok(report)
    }

    async fn open_chat(&self, request: &ChatRequest) -> TurnResult<ByteStream> {
        let response = self
            .client
            .post(&self.chat_url)
            .json(request)
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            return Err(failure(response, None).await);
        }

        Ok(response
            .bytes_stream()
            .map_err(|e| TransportError::Body(e.to_string()))
            .boxed())
    }

    async fn health_check(&self) -> TurnResult<bool> {
        match self.bounded(self.client.get(&self.health_url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(err) => {
                warn!(error = %err, url = %self.health_url, "health probe failed");
                Ok(false)
            }
        }
    }
}
