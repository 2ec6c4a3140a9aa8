//! Translation provider client.
//!
//! Wraps the cloud translation REST API for language detection,
//! translation and language-name lookup. The language-name table is
//! fetched lazily and cached for the process lifetime.

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::Settings;
use crate::domain::language::DetectedLanguage;
use crate::services::ProviderError;

/// Language detection and translation collaborator.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, ProviderError>;

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Client for the Google Cloud Translation v2 REST API.
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    /// code -> display name, populated on first lookup.
    language_names: RwLock<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct DetectBody {
    data: DetectData,
}

#[derive(Deserialize)]
struct DetectData {
    detections: Vec<Vec<Detection>>,
}

#[derive(Deserialize)]
struct Detection {
    language: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Deserialize)]
struct TranslateBody {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Deserialize)]
struct LanguagesBody {
    data: LanguagesData,
}

#[derive(Deserialize)]
struct LanguagesData {
    languages: Vec<LanguageEntry>,
}

#[derive(Deserialize)]
struct LanguageEntry {
    language: String,
    #[serde(default)]
    name: String,
}

impl GoogleTranslator {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.ai_timeout_seconds))
            .build()?;

        tracing::info!(base_url = %settings.translate_api_url, "Translation client initialized");

        Ok(Self {
            client,
            base_url: settings.translate_api_url.trim_end_matches('/').to_string(),
            api_key: settings.translate_api_key.clone(),
            language_names: RwLock::new(HashMap::new()),
        })
    }

    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("translation provider"))
    }

    async fn post_form<R: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<R, ProviderError> {
        let key = self.key()?;
        let url = format!("{}{}", self.base_url, path);

        debug!(url = %url, "Translation API request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .form(params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Translation API request failed");
                ProviderError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "no response body".to_string());
            error!(status = %status, "Translation API error");
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    /// Resolve a display name for a language code, fetching the supported
    /// language table once and falling back to "Language (xx)".
    async fn language_name(&self, code: &str) -> String {
        if let Some(name) = self.language_names.read().get(code) {
            return name.clone();
        }

        match self.fetch_language_names().await {
            Ok(names) => {
                let resolved = names
                    .get(code)
                    .cloned()
                    .unwrap_or_else(|| format!("Language ({})", code));
                *self.language_names.write() = names;
                resolved
            }
            Err(e) => {
                debug!(error = %e, "Failed to fetch supported languages");
                format!("Language ({})", code)
            }
        }
    }

    async fn fetch_language_names(&self) -> Result<HashMap<String, String>, ProviderError> {
        let key = self.key()?;
        let url = format!("{}/languages", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", key), ("target", "en")])
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: "failed to list supported languages".to_string(),
            });
        }

        let body: LanguagesBody = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(body
            .data
            .languages
            .into_iter()
            .map(|l| (l.language, l.name))
            .collect())
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslator {
    async fn detect_language(&self, text: &str) -> Result<DetectedLanguage, ProviderError> {
        let body: DetectBody = self.post_form("/detect", &[("q", text)]).await?;

        let detection = body
            .data
            .detections
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| {
                ProviderError::InvalidResponse("detection response was empty".to_string())
            })?;

        let name = self.language_name(&detection.language).await;

        Ok(DetectedLanguage {
            code: detection.language,
            name,
            confidence: detection.confidence,
        })
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, ProviderError> {
        let body: TranslateBody = self
            .post_form(
                "",
                &[
                    ("q", text),
                    ("source", source),
                    ("target", target),
                    ("format", "text"),
                ],
            )
            .await?;

        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("translation response was empty".to_string())
            })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        // Listing supported languages is the cheapest authenticated call.
        self.fetch_language_names().await.map(|_| ())
    }
}
