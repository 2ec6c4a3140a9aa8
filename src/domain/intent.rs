//! Intent classification and routing types.

use serde::{Deserialize, Serialize};

/// User intent as classified by the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Grading,
    Explanation,
    #[serde(other)]
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grading => "grading",
            Self::Explanation => "explanation",
            Self::General => "general",
        }
    }
}

/// Classification result from the intent provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl IntentClassification {
    /// Fallback used when the classifier is unavailable or errors:
    /// intent is advisory, so failures never block the pipeline.
    pub fn fallback(reason: &str) -> Self {
        Self {
            intent: Intent::General,
            confidence: 0.0,
            reasoning: format!("Classification failed: {}", reason),
        }
    }
}

/// Where the chat pipeline dispatches after intent routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Confident grading intent with a document attached.
    GradeDocument,
    /// Confident grading intent but nothing to grade.
    PromptForDocument,
    /// Confident explanation intent.
    ExplainTopic,
    /// Recognized intent below the confidence threshold.
    Clarify(Intent),
    /// General conversation or unknown intent.
    GeneralReply,
}
