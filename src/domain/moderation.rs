//! Moderation analysis types.

use serde::{Deserialize, Serialize};

/// Structured analysis returned by the moderation model.
///
/// Decoded defensively: every field has a safe default so partial model
/// output never fails the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationAnalysis {
    #[serde(default)]
    pub analysis: String,
    #[serde(default)]
    pub inappropriate_categories: Vec<String>,
    #[serde(default)]
    pub severity_score: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default = "default_explanation")]
    pub explanation: String,
}

fn default_explanation() -> String {
    "No explanation provided".to_string()
}

impl ModerationAnalysis {
    /// Fallback when the model's output is not parseable as structured
    /// data: keep the raw text as unstructured analysis, flag nothing.
    pub fn unstructured(raw: &str) -> Self {
        Self {
            analysis: raw.to_string(),
            inappropriate_categories: Vec::new(),
            severity_score: 0.0,
            confidence: 0.5,
            explanation: "Analysis completed but response format was unexpected".to_string(),
        }
    }
}

/// Output of the moderation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationOutcome {
    pub approved: bool,
    pub confidence: f64,
    pub flagged_categories: Vec<String>,
    pub explanation: String,
    pub severity_score: f64,
}

/// Moderation metadata surfaced to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationInfo {
    pub approved: bool,
    pub confidence: f64,
    pub flagged_categories: Vec<String>,
    pub explanation: String,
}

impl ModerationInfo {
    pub fn from_outcome(outcome: &ModerationOutcome) -> Self {
        Self {
            approved: outcome.approved,
            confidence: outcome.confidence,
            flagged_categories: outcome.flagged_categories.clone(),
            explanation: outcome.explanation.clone(),
        }
    }
}
