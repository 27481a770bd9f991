use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::protocol::UPLOAD_FIELD;
use url::Url;

/// A file picked by the user, read fully into memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image file {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("path has no file name: {}", path.display()))?;
        Ok(Self::new(file_name, bytes))
    }
}

/// Status and body of an upload response, before any interpretation.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// Sends the file as a single multipart `image` field. Errors are
    /// transport-level only; non-2xx statuses come back as responses.
    async fn post_image(&self, file: SelectedFile) -> Result<TransportResponse>;
}

pub struct HttpUploadTransport {
    http: Client,
    upload_url: Url,
}

impl HttpUploadTransport {
    pub fn new(upload_url: Url) -> Self {
        Self {
            http: Client::new(),
            upload_url,
        }
    }
}

#[async_trait]
impl UploadTransport for HttpUploadTransport {
    async fn post_image(&self, file: SelectedFile) -> Result<TransportResponse> {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(mime_type) = file.mime_type.as_deref() {
            part = part
                .mime_str(mime_type)
                .with_context(|| format!("invalid mime type {mime_type}"))?;
        }
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .http
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("failed to reach {}", self.upload_url))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("failed to read upload response body")?;

        Ok(TransportResponse { status, body })
    }
}
