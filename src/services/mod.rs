//! Service layer modules for external integrations.
//!
//! Contains the response cache plus one client per AI collaborator:
//! translation, moderation, intent classification, grading, explanation,
//! document text extraction and quiz publishing. Every collaborator sits
//! behind a trait so tests can inject mocks.

pub mod cache;
pub mod explainer;
pub mod extractor;
pub mod grader;
pub mod intent;
pub mod llm;
pub mod moderator;
pub mod quiz;
pub mod translator;

pub use cache::ResponseCache;
pub use explainer::{ExplanationProvider, LlmExplainer};
pub use extractor::{looks_like_pdf, DocumentExtractor, RemoteDocumentExtractor};
pub use grader::{GradingProvider, LlmGrader};
pub use intent::{IntentClassifier, LlmIntentClassifier};
pub use llm::LlmClient;
pub use moderator::{LlmModerator, ModerationProvider};
pub use quiz::{FormsQuizClient, QuizProvider};
pub use translator::{GoogleTranslator, TranslationProvider};

use thiserror::Error;

/// Failure from an external AI collaborator.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing credentials for {0}")]
    MissingCredentials(&'static str),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
