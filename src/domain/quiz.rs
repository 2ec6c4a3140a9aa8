//! Quiz generation DTOs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const QUIZ_TITLE_PREFIX: &str = "Auto Quiz";
pub const QUIZ_QUESTION_TARGET: usize = 20;
pub const QUIZ_OPTIONS_PER_QUESTION: usize = 4;
pub const QUIZ_TOPIC_MAX_CHARS: usize = 100;

/// Quiz difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Title-cased label for form titles.
    pub fn title_label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err("Difficulty must be one of: easy, medium, hard".to_string()),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mcq {
    pub question: String,
    pub options: Vec<String>,
    pub answer_index: usize,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Mcq {
    /// A question survives filtering only with a non-empty stem, exactly
    /// four non-empty options and an in-range answer index.
    pub fn is_valid(&self) -> bool {
        !self.question.trim().is_empty()
            && self.options.len() == QUIZ_OPTIONS_PER_QUESTION
            && self.answer_index < self.options.len()
            && self.options.iter().all(|o| !o.trim().is_empty())
    }
}

/// Metadata for a quiz published to the external forms provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizCreated {
    pub form_id: String,
    pub responder_url: String,
    pub title: String,
    pub description: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_count: usize,
}

/// Request for quiz generation.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizGenerationRequest {
    pub topic: String,
    pub difficulty: String,
    #[serde(default = "super::chat::default_user_id")]
    pub user_id: String,
}

/// Response for quiz generation.
#[derive(Debug, Clone, Serialize)]
pub struct QuizGenerationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_info: Option<QuizCreated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
    pub timestamp: String,
}

/// Static input contract for quiz generation.
#[derive(Debug, Clone, Serialize)]
pub struct QuizRequirements {
    pub required_fields: Vec<&'static str>,
    pub topic_requirements: TopicRequirements,
    pub difficulty_options: DifficultyOptions,
    pub output: QuizOutputSpec,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicRequirements {
    pub r#type: &'static str,
    pub min_length: usize,
    pub max_length: usize,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DifficultyOptions {
    pub r#type: &'static str,
    pub values: Vec<&'static str>,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizOutputSpec {
    pub question_count: usize,
    pub question_type: &'static str,
    pub options_per_question: usize,
    pub platform: &'static str,
}

impl QuizRequirements {
    pub fn current() -> Self {
        Self {
            required_fields: vec!["topic", "difficulty"],
            topic_requirements: TopicRequirements {
                r#type: "string",
                min_length: 1,
                max_length: QUIZ_TOPIC_MAX_CHARS,
                description: "The subject or topic for the quiz questions",
            },
            difficulty_options: DifficultyOptions {
                r#type: "enum",
                values: vec!["easy", "medium", "hard"],
                description: "The difficulty level for the quiz questions",
            },
            output: QuizOutputSpec {
                question_count: QUIZ_QUESTION_TARGET,
                question_type: "multiple_choice",
                options_per_question: QUIZ_OPTIONS_PER_QUESTION,
                platform: "Google Forms",
            },
        }
    }
}
