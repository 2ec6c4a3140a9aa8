//! Translation + moderation processing DTOs.

use serde::{Deserialize, Serialize};

/// Request for the text processing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TextProcessRequest {
    pub text: String,
    #[serde(default = "super::chat::default_user_id")]
    pub user_id: String,
}

/// Per-field breakdown of translation + moderation for one text.
#[derive(Debug, Clone, Serialize)]
pub struct TextProcessResponse {
    pub success: bool,
    pub input_text: String,
    pub original_language: String,
    pub original_language_code: String,
    pub translation_confidence: f64,
    pub translated_text: String,
    pub is_english: bool,
    pub moderation_approved: bool,
    pub moderation_confidence: f64,
    pub flagged_categories: Vec<String>,
    pub moderation_explanation: String,
    pub final_approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub processing_time_ms: u64,
    pub timestamp: String,
}

/// Request for the explanation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplanationRequest {
    pub topic: String,
    #[serde(default = "super::chat::default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub include_history: Option<bool>,
}

/// Response for the explanation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ExplanationResponse {
    pub success: bool,
    pub topic: String,
    pub explanation: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
