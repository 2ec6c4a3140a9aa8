//! Per-request pipeline state.

use crate::domain::chat::ExplanationOutcome;
use crate::domain::grading::GradingReport;
use crate::domain::intent::IntentClassification;
use crate::domain::language::TranslationOutcome;
use crate::domain::moderation::ModerationOutcome;
use crate::error::StageError;

/// Mutable record threaded through the chat pipeline stages.
///
/// Owned exclusively by one orchestration run; never shared across
/// concurrent requests.
#[derive(Debug, Default)]
pub struct PipelineState {
    /// Trimmed user message, when one was supplied.
    pub message: Option<String>,
    /// Raw base64 document payload, when one was supplied.
    pub document: Option<String>,

    pub translation: Option<TranslationOutcome>,
    pub moderation: Option<ModerationOutcome>,
    pub intent: Option<IntentClassification>,

    pub grading_result: Option<GradingReport>,
    pub explanation_result: Option<ExplanationOutcome>,

    /// First stage failure, when a stage degraded the run.
    pub stage_error: Option<StageError>,

    /// Ordered response fragments accumulated across stages.
    pub parts: Vec<String>,

    pub final_approved: bool,
}

impl PipelineState {
    pub fn new(message: Option<String>, document: Option<String>) -> Self {
        Self {
            message,
            document,
            final_approved: true,
            ..Default::default()
        }
    }

    pub fn has_message(&self) -> bool {
        self.message.as_deref().is_some_and(|m| !m.trim().is_empty())
    }

    pub fn has_document(&self) -> bool {
        self.document.as_deref().is_some_and(|d| !d.is_empty())
    }

    pub fn push_part(&mut self, part: impl Into<String>) {
        self.parts.push(part.into());
    }

    /// Keep the first stage failure; later ones only add response parts.
    pub fn record_error(&mut self, error: StageError) {
        if self.stage_error.is_none() {
            self.stage_error = Some(error);
        }
    }

    /// Language code to translate the final response into, when the
    /// detected source language is known and not English.
    pub fn reply_language_code(&self) -> Option<&str> {
        self.translation
            .as_ref()
            .filter(|t| !t.is_english)
            .map(|t| t.detected_language_code.as_str())
    }

    /// English text to feed downstream stages: the translation when one
    /// happened, otherwise the raw message.
    pub fn english_text(&self) -> Option<&str> {
        self.translation
            .as_ref()
            .map(|t| t.translated_text.as_str())
            .or(self.message.as_deref())
    }
}
