//! Assignment grading provider.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::grading::GradingOutcome;
use crate::services::llm::{ChatOptions, LlmClient};
use crate::services::ProviderError;

const GRADING_SYSTEM_PROMPT: &str = "You are a fair and consistent grading assistant. \
Grade the assignment strictly against the provided rubric and respond with a JSON object \
containing \"marks_obtained\" (integer) and \"feedback\" (3-4 sentences of constructive feedback).";

/// Grading collaborator: score extracted document text against a rubric.
#[async_trait]
pub trait GradingProvider: Send + Sync {
    async fn grade(
        &self,
        assignment_text: &str,
        rubric: &str,
        total_marks: u32,
    ) -> Result<GradingOutcome, ProviderError>;
}

/// LLM-backed grading provider.
pub struct LlmGrader {
    llm: Arc<LlmClient>,
}

#[derive(Deserialize)]
struct GradingPayload {
    #[serde(default)]
    marks_obtained: u32,
    #[serde(default)]
    feedback: String,
}

impl LlmGrader {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl GradingProvider for LlmGrader {
    async fn grade(
        &self,
        assignment_text: &str,
        rubric: &str,
        total_marks: u32,
    ) -> Result<GradingOutcome, ProviderError> {
        let options = ChatOptions {
            temperature: 0.2,
            max_tokens: 1000,
            json_response: true,
            ..Default::default()
        };

        let user = format!(
            "Here is the grading rubric and questions:\n{}\n\nAssignment Text:\n{}\n\n\
             Please provide:\n1. A numeric score out of {}\n2. Short constructive feedback (3-4 sentences)",
            rubric, assignment_text, total_marks
        );

        let raw = self.llm.chat(GRADING_SYSTEM_PROMPT, &user, &options).await?;

        let payload: GradingPayload = serde_json::from_str(extract_json_object(&raw))
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(GradingOutcome {
            // Guard against models scoring above the scale
            marks_obtained: payload.marks_obtained.min(total_marks),
            total_marks,
            feedback: payload.feedback,
        })
    }
}

/// Strip markdown code fences or surrounding prose from a JSON reply by
/// slicing from the first `{` to the last `}`.
fn extract_json_object(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => text,
    }
}
