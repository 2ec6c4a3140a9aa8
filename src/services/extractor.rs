//! Document text extraction.
//!
//! PDF magic-byte validation happens locally; actual text extraction
//! (including OCR for scanned pages) is delegated to the document service.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use crate::config::Settings;
use crate::services::ProviderError;

/// PDF files start with `%PDF`.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF")
}

/// Document text extraction collaborator.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ProviderError>;
}

/// Client for the document extraction service.
pub struct RemoteDocumentExtractor {
    client: Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct ExtractRequest {
    /// Base64-encoded PDF data.
    document: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    text: String,
}

impl RemoteDocumentExtractor {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.ai_timeout_seconds))
            .build()?;

        tracing::info!(base_url = %settings.document_service_url, "Document extraction client initialized");

        Ok(Self {
            client,
            base_url: settings.document_service_url.trim_end_matches('/').to_string(),
            token: settings.document_service_token.clone(),
        })
    }
}

#[async_trait]
impl DocumentExtractor for RemoteDocumentExtractor {
    async fn extract_text(&self, pdf_bytes: &[u8]) -> Result<String, ProviderError> {
        let url = format!("{}/v1/documents/extract", self.base_url);
        debug!(url = %url, size = pdf_bytes.len(), "Document extraction request");

        let mut request = self.client.post(&url).json(&ExtractRequest {
            document: BASE64.encode(pdf_bytes),
        });
        if let Some(token) = &self.token {
            request = request.header("X-Internal-Token", token);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Document extraction request failed");
            ProviderError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Document extraction service error");
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: format!("document extraction failed with status {}", status),
            });
        }

        let body: ExtractResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(body.text.trim().to_string())
    }
}
