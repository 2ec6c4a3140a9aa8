//! Quiz generation provider.
//!
//! Two-step collaborator: the LLM generates a set of multiple-choice
//! questions, then the forms API publishes them as a quiz form. Malformed
//! questions are filtered out before publishing.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Settings;
use crate::domain::quiz::{
    Difficulty, Mcq, QuizCreated, QUIZ_QUESTION_TARGET, QUIZ_TITLE_PREFIX,
};
use crate::services::llm::{ChatOptions, LlmClient};
use crate::services::ProviderError;

/// Quiz collaborator: generated question set + external form metadata.
#[async_trait]
pub trait QuizProvider: Send + Sync {
    async fn create_quiz(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<QuizCreated, ProviderError>;
}

/// Quiz provider backed by the LLM and the forms API.
pub struct FormsQuizClient {
    llm: Arc<LlmClient>,
    client: Client,
    forms_base_url: String,
    forms_token: Option<String>,
}

#[derive(Deserialize)]
struct McqBatch {
    #[serde(default)]
    questions: Vec<Mcq>,
}

#[derive(Deserialize)]
struct CreatedForm {
    #[serde(rename = "formId")]
    form_id: String,
    #[serde(rename = "responderUri", default)]
    responder_uri: String,
}

impl FormsQuizClient {
    pub fn new(llm: Arc<LlmClient>, settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.ai_timeout_seconds))
            .build()?;

        Ok(Self {
            llm,
            client,
            forms_base_url: settings.forms_api_url.trim_end_matches('/').to_string(),
            forms_token: settings.forms_api_token.clone(),
        })
    }

    fn forms_token(&self) -> Result<&str, ProviderError> {
        self.forms_token
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("forms provider"))
    }

    async fn generate_mcqs(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<Vec<Mcq>, ProviderError> {
        let system = "You are an expert assessment designer. Output JSON only.";
        let user = format!(
            "Create EXACTLY {count} high-quality multiple-choice questions for the topic \
             \"{topic}\" at \"{difficulty}\" difficulty.\n\n\
             Output a JSON object: {{\"questions\": [{{\"question\": \"...\", \
             \"options\": [\"A\", \"B\", \"C\", \"D\"], \"answer_index\": 0, \
             \"explanation\": \"...\"}}]}}\n\n\
             STRICT constraints:\n\
             - EXACTLY {count} questions\n\
             - EXACTLY 4 options per question\n\
             - The correct option index is 0-3 in \"answer_index\"\n\
             - Keep questions unambiguous and not opinion-based\n\
             - Prefer varied cognitive levels (recall, apply, analyze) within the given difficulty",
            count = QUIZ_QUESTION_TARGET,
            topic = topic,
            difficulty = difficulty,
        );

        let options = ChatOptions {
            temperature: 0.4,
            max_tokens: 4000,
            json_response: true,
            ..Default::default()
        };

        let raw = self.llm.chat(system, &user, &options).await?;
        let batch: McqBatch = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let before = batch.questions.len();
        let mut questions: Vec<Mcq> = batch.questions.into_iter().filter(Mcq::is_valid).collect();
        questions.truncate(QUIZ_QUESTION_TARGET);

        if questions.len() < before {
            warn!(
                kept = questions.len(),
                generated = before,
                "Filtered malformed quiz questions"
            );
        }

        Ok(questions)
    }

    async fn publish_form(
        &self,
        title: &str,
        description: &str,
        questions: &[Mcq],
    ) -> Result<CreatedForm, ProviderError> {
        let token = self.forms_token()?;

        // Create the form shell, then add questions in one batch update.
        let create_url = format!("{}/v1/forms", self.forms_base_url);
        debug!(url = %create_url, "Creating quiz form");

        let response = self
            .client
            .post(&create_url)
            .bearer_auth(token)
            .json(&json!({ "info": { "title": title } }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Form creation failed");
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: format!("form creation failed with status {}", status),
            });
        }

        let form: CreatedForm = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let mut requests = vec![json!({
            "updateFormInfo": {
                "info": { "description": description },
                "updateMask": "description"
            }
        })];
        for (index, mcq) in questions.iter().enumerate() {
            requests.push(json!({
                "createItem": {
                    "item": {
                        "title": mcq.question,
                        "questionItem": {
                            "question": {
                                "required": true,
                                "choiceQuestion": {
                                    "type": "RADIO",
                                    "options": mcq.options.iter()
                                        .map(|o| json!({ "value": o }))
                                        .collect::<Vec<_>>(),
                                },
                                "grading": {
                                    "pointValue": 1,
                                    "correctAnswers": {
                                        "answers": [{ "value": mcq.options[mcq.answer_index] }]
                                    }
                                }
                            }
                        }
                    },
                    "location": { "index": index }
                }
            }));
        }

        let batch_url = format!("{}/v1/forms/{}:batchUpdate", self.forms_base_url, form.form_id);
        let response = self
            .client
            .post(&batch_url)
            .bearer_auth(token)
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, form_id = %form.form_id, "Form batch update failed");
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: format!("form update failed with status {}", status),
            });
        }

        Ok(form)
    }
}

#[async_trait]
impl QuizProvider for FormsQuizClient {
    async fn create_quiz(
        &self,
        topic: &str,
        difficulty: Difficulty,
    ) -> Result<QuizCreated, ProviderError> {
        info!(topic = %topic, difficulty = %difficulty, "Generating quiz");

        let questions = self.generate_mcqs(topic, difficulty).await?;
        if questions.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "no valid questions were generated".to_string(),
            ));
        }
        if questions.len() < QUIZ_QUESTION_TARGET / 2 {
            warn!(count = questions.len(), "Question count is well below target");
        }

        let title = format!(
            "{}: {} ({})",
            QUIZ_TITLE_PREFIX,
            title_case(topic),
            difficulty.title_label()
        );
        let description = format!(
            "Auto-generated quiz on {} at {} difficulty level. This quiz contains {} multiple-choice questions.",
            topic,
            difficulty,
            questions.len()
        );

        let form = self.publish_form(&title, &description, &questions).await?;
        info!(form_id = %form.form_id, count = questions.len(), "Quiz form created");

        Ok(QuizCreated {
            form_id: form.form_id,
            responder_url: form.responder_uri,
            title,
            description,
            topic: topic.to_string(),
            difficulty,
            question_count: questions.len(),
        })
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
