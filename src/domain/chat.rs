//! Chat endpoint request/response DTOs.

use serde::{Deserialize, Serialize};

use super::grading::GradingReport;
use super::language::TranslationInfo;
use super::moderation::ModerationInfo;

/// Request for the chat endpoint.
///
/// Invariant: at least one of `message` / `document` must be present;
/// the orchestrator rejects requests carrying neither.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Base64-encoded PDF data.
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

pub fn default_user_id() -> String {
    "anonymous".to_string()
}

/// Explanation metadata surfaced to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationOutcome {
    pub topic: String,
    pub explanation: String,
    pub intent_confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Response for the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub user_message: String,
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_info: Option<TranslationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_info: Option<ModerationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grading_result: Option<GradingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_result: Option<ExplanationOutcome>,
    pub final_approved: bool,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    /// Minimal failure response carrying only a user-facing reply.
    pub fn failure(user_message: impl Into<String>, reply: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            user_message: user_message.into(),
            reply: reply.into(),
            translation_info: None,
            moderation_info: None,
            grading_result: None,
            explanation_result: None,
            final_approved: false,
            timestamp: chrono::Utc::now().to_rfc3339(),
            error: Some(error.into()),
        }
    }
}
