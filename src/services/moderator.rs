//! Content moderation provider.
//!
//! Returns the model's raw analysis text; the moderation stage owns the
//! structured parse (and its format-drift fallback), keeping this client a
//! pure transport concern.

use async_trait::async_trait;
use std::sync::Arc;

use crate::services::llm::{ChatOptions, LlmClient};
use crate::services::ProviderError;

const MODERATION_SYSTEM_PROMPT: &str = r#"You are a professional content moderation AI. Your job is to analyze text content and identify any inappropriate material.

Analyze the provided text for the following categories of inappropriate content:
1. VULGAR: Profanity, crude language, offensive words
2. SEXUAL: Sexual content, adult themes, inappropriate sexual references
3. HATEFUL: Hate speech, discrimination, harassment based on race, gender, religion, etc.
4. VIOLENT: Graphic violence, threats, harmful content
5. HARASSMENT: Bullying, personal attacks, intimidation
6. ILLEGAL: Content promoting illegal activities
7. SPAM: Repetitive, promotional, or spam-like content
8. MISINFORMATION: False or misleading information that could cause harm

Respond with a JSON object containing:
{
    "analysis": "Detailed analysis of the content",
    "inappropriate_categories": ["list", "of", "flagged", "categories"],
    "severity_score": 0.0-1.0,
    "confidence": 0.0-1.0,
    "explanation": "Clear explanation of why content was flagged or approved"
}

Be thorough but fair. Consider context and intent. Minor profanity in casual conversation may be acceptable, but hate speech or explicit sexual content should be flagged."#;

/// Moderation collaborator: raw analysis text for a given input.
#[async_trait]
pub trait ModerationProvider: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<String, ProviderError>;
}

/// LLM-backed moderation provider.
pub struct LlmModerator {
    llm: Arc<LlmClient>,
}

impl LlmModerator {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ModerationProvider for LlmModerator {
    async fn analyze(&self, text: &str) -> Result<String, ProviderError> {
        let user = format!(
            "Please analyze this text for inappropriate content:\n\n{}",
            text
        );

        self.llm
            .chat(MODERATION_SYSTEM_PROMPT, &user, &ChatOptions::default())
            .await
    }
}
