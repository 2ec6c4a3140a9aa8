//! Educational explanation provider.
//!
//! Keeps a rolling window of prior exchanges so follow-up questions carry
//! context; the window is capped at the last ten exchanges.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::services::llm::{ChatOptions, LlmClient};
use crate::services::ProviderError;

const EXPLANATION_SYSTEM_PROMPT: &str = r#"You are an expert educational AI assistant. Your role is to provide clear, comprehensive, and engaging explanations on any topic the user asks about.

Guidelines for your responses:
1. Provide accurate and well-structured explanations
2. Use simple language when possible, but don't oversimplify complex concepts
3. Include examples when helpful
4. Break down complex topics into digestible parts
5. Encourage further learning by suggesting related topics or resources
6. If the topic is very broad, ask for clarification or provide an overview with key subtopics
7. Always maintain an encouraging and supportive tone
8. If you're unsure about something, acknowledge it and provide the best information you can

Remember: Your goal is to help users learn and understand, not just provide answers."#;

const MAX_HISTORY_EXCHANGES: usize = 10;

/// Explanation collaborator: prose explanation for a topic or question.
#[async_trait]
pub trait ExplanationProvider: Send + Sync {
    async fn explain(&self, topic: &str, include_history: bool) -> Result<String, ProviderError>;
}

/// LLM-backed explanation provider with conversation memory.
pub struct LlmExplainer {
    llm: Arc<LlmClient>,
    model: String,
    history: Mutex<Vec<(String, String)>>,
}

impl LlmExplainer {
    pub fn new(llm: Arc<LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            model: model.into(),
            history: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ExplanationProvider for LlmExplainer {
    async fn explain(&self, topic: &str, include_history: bool) -> Result<String, ProviderError> {
        let options = ChatOptions {
            model: Some(self.model.clone()),
            temperature: 0.7,
            max_tokens: 1500,
            json_response: false,
        };

        let history = if include_history {
            self.history.lock().clone()
        } else {
            Vec::new()
        };

        let explanation = self
            .llm
            .chat_with_history(EXPLANATION_SYSTEM_PROMPT, &history, topic, &options)
            .await?;
        let explanation = explanation.trim().to_string();

        let mut history = self.history.lock();
        history.push((topic.to_string(), explanation.clone()));
        if history.len() > MAX_HISTORY_EXCHANGES {
            let excess = history.len() - MAX_HISTORY_EXCHANGES;
            history.drain(..excess);
        }

        Ok(explanation)
    }
}
