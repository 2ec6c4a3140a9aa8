//! Chat-completions client for the LLM provider.
//!
//! One shared client backs moderation, intent classification, grading,
//! explanation and quiz question generation. Transient upstream failures
//! (timeouts, 429, 5xx) are retried with exponential backoff; everything
//! else surfaces immediately as a `ProviderError`.

use backoff::ExponentialBackoff;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::config::Settings;
use crate::services::ProviderError;

const RETRY_MAX_ELAPSED_SECS: u64 = 30;

/// Client for an OpenAI-compatible chat-completions API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
}

/// Per-call knobs; each capability tunes these differently.
#[derive(Debug, Clone)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_response: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.1,
            max_tokens: 1000,
            json_response: false,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct UpstreamErrorBody {
    error: Option<UpstreamErrorDetail>,
}

#[derive(Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

impl LlmClient {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.ai_timeout_seconds))
            .build()?;

        tracing::info!(base_url = %settings.llm_api_url, model = %settings.llm_model, "LLM client initialized");

        Ok(Self {
            client,
            base_url: settings.llm_api_url.trim_end_matches('/').to_string(),
            api_key: settings.llm_api_key.clone(),
            default_model: settings.llm_model.clone(),
        })
    }

    pub fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Run one system+user exchange and return the assistant's text.
    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        options: &ChatOptions,
    ) -> Result<String, ProviderError> {
        self.chat_with_history(system, &[], user, options).await
    }

    /// Run an exchange with prior (user, assistant) turns for context.
    pub async fn chat_with_history(
        &self,
        system: &str,
        history: &[(String, String)],
        user: &str,
        options: &ChatOptions,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("LLM provider"))?;

        let mut messages = vec![ChatMessage {
            role: "system",
            content: system,
        }];
        for (past_user, past_assistant) in history {
            messages.push(ChatMessage {
                role: "user",
                content: past_user,
            });
            messages.push(ChatMessage {
                role: "assistant",
                content: past_assistant,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: user,
        });

        let body = ChatCompletionRequest {
            model: options.model.as_deref().unwrap_or(&self.default_model),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            response_format: options.json_response.then(|| ResponseFormat {
                r#type: "json_object",
            }),
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %body.model, "LLM request");

        let backoff_policy = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(RETRY_MAX_ELAPSED_SECS)),
            ..Default::default()
        };

        let response = backoff::future::retry(backoff_policy, || async {
            let response = self
                .client
                .post(&url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, "LLM request failed, will retry");
                    backoff::Error::transient(ProviderError::Transport(e.to_string()))
                })?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let message = upstream_message(response).await;
                warn!(status = %status, message = %message, "LLM transient upstream error, will retry");
                return Err(backoff::Error::transient(ProviderError::Upstream {
                    status: status.as_u16(),
                    message,
                }));
            }
            if !status.is_success() {
                let message = upstream_message(response).await;
                error!(status = %status, message = %message, "LLM upstream error");
                return Err(backoff::Error::permanent(ProviderError::Upstream {
                    status: status.as_u16(),
                    message,
                }));
            }

            response
                .json::<ChatCompletionResponse>()
                .await
                .map_err(|e| {
                    backoff::Error::permanent(ProviderError::InvalidResponse(e.to_string()))
                })
        })
        .await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "completion contained no content".to_string(),
            ));
        }

        Ok(content)
    }

    /// Cheap reachability probe against the models listing.
    pub async fn health_check(&self) -> Result<(), ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredentials("LLM provider"))?;

        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: upstream_message(response).await,
            })
        }
    }
}

async fn upstream_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<UpstreamErrorBody>()
        .await
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
        .unwrap_or_else(|| format!("LLM provider error: {}", status))
}
