//! HTTP upload transport adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::{UploadError, UploadTransport};
use crate::domain::upload::{UploadRequest, UploadResult};

/// Multipart field carrying the audio payload
const AUDIO_FIELD: &str = "audio";

/// Multipart field carrying the template id
const TEMPLATE_FIELD: &str = "template";

/// Body of the backend health endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Uploads recordings to `{base_url}/upload`
pub struct HttpUploadTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpUploadTransport {
    /// Create a transport for the given backend origin.
    /// Trailing slashes are ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    fn build_form(request: UploadRequest) -> Result<Form, UploadError> {
        let file_name = request.format.file_name();
        let content_type = request.format.content_type().to_string();

        let audio = Part::bytes(request.audio)
            .file_name(file_name)
            .mime_str(&content_type)
            .map_err(|e| UploadError::Network(format!("invalid content type {}: {}", content_type, e)))?;

        Ok(Form::new()
            .part(AUDIO_FIELD, audio)
            .text(TEMPLATE_FIELD, request.template.as_str().to_string()))
    }

    /// Query the backend health endpoint
    pub async fn health(&self) -> Result<HealthStatus, UploadError> {
        let response = self
            .client
            .get(self.health_url())
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn upload(&self, request: UploadRequest) -> Result<UploadResult, UploadError> {
        let url = self.upload_url();
        debug!(%url, bytes = request.size_bytes(), "posting recording");
        let form = Self::build_form(request)?;

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        serde_json::from_str::<UploadResult>(&body)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))
    }
}
