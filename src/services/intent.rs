//! Intent classification provider.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::domain::intent::IntentClassification;
use crate::services::llm::{ChatOptions, LlmClient};
use crate::services::ProviderError;

const INTENT_SYSTEM_PROMPT: &str = r#"You are an intelligent intent classifier for an educational platform. Analyze the user's message and determine their primary intent.

Classify the intent as one of these categories:
1. "grading" - User wants to grade, evaluate, assess, score, or get feedback on their work/assignment
2. "explanation" - User wants to learn about, understand, or get an explanation of a concept/topic
3. "general" - General conversation, greetings, or unclear intent

Consider context clues like:
- Grading: mentions of assignments, homework, tests, scores, evaluation, feedback, "how did I do", "grade this", "assess my work"
- Explanation: questions about concepts, "what is", "how does", "explain", "tell me about", learning requests
- General: greetings, casual conversation, unclear requests

Respond with a JSON object containing:
{
  "intent": "grading|explanation|general",
  "confidence": 0.0-1.0,
  "reasoning": "brief explanation of why you chose this intent"
}"#;

/// Intent classification collaborator.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<IntentClassification, ProviderError>;
}

/// LLM-backed intent classifier.
pub struct LlmIntentClassifier {
    llm: Arc<LlmClient>,
}

impl LlmIntentClassifier {
    pub fn new(llm: Arc<LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl IntentClassifier for LlmIntentClassifier {
    async fn classify(&self, text: &str) -> Result<IntentClassification, ProviderError> {
        let options = ChatOptions {
            max_tokens: 200,
            json_response: true,
            ..Default::default()
        };

        let user = format!("Classify this message: '{}'", text);
        let raw = self.llm.chat(INTENT_SYSTEM_PROMPT, &user, &options).await?;

        let classification: IntentClassification = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        debug!(
            intent = classification.intent.as_str(),
            confidence = classification.confidence,
            "Intent classified"
        );

        Ok(classification)
    }
}
