//! Language detection and translation results.

use serde::{Deserialize, Serialize};

/// Result of language detection from the translation provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedLanguage {
    /// ISO language code, e.g. "en", "ar", "es".
    pub code: String,
    /// Human-readable language name, e.g. "Arabic".
    pub name: String,
    /// Detection confidence in [0, 1].
    pub confidence: f64,
}

/// Output of the translation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationOutcome {
    pub detected_language: String,
    pub detected_language_code: String,
    pub confidence: f64,
    pub translated_text: String,
    pub is_english: bool,
}

/// Translation metadata surfaced to the client for non-English input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationInfo {
    pub original_language: String,
    pub original_language_code: String,
    pub translated_text: String,
    pub confidence: f64,
}

impl TranslationInfo {
    pub fn from_outcome(outcome: &TranslationOutcome) -> Self {
        Self {
            original_language: outcome.detected_language.clone(),
            original_language_code: outcome.detected_language_code.clone(),
            translated_text: outcome.translated_text.clone(),
            confidence: outcome.confidence,
        }
    }
}
