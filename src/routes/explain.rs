//! Educational explanation endpoint.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::process::{ExplanationRequest, ExplanationResponse};
use crate::error::{ApiError, ApiResult};

const TOPIC_MAX_CHARS: usize = 1000;

/// Get an educational explanation for a specific topic.
///
/// POST /explain
pub async fn explain_topic(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExplanationRequest>,
) -> ApiResult<Json<ExplanationResponse>> {
    tracing::info!(user_id = %request.user_id, topic = %request.topic, "Explanation request");

    // Validate input
    if request.topic.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Topic is required and cannot be empty".to_string(),
        ));
    }
    if request.topic.chars().count() > TOPIC_MAX_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Topic is too long (maximum {} characters)",
            TOPIC_MAX_CHARS
        )));
    }

    if !state.status.explanation_available() {
        return Err(ApiError::ServiceUnavailable(
            "Explanation service is not available".to_string(),
        ));
    }

    let include_history = request.include_history.unwrap_or(true);

    match state.explainer.explain(&request.topic, include_history).await {
        Ok(explanation) => {
            tracing::info!(topic = %request.topic, "Explanation generated");
            Ok(Json(ExplanationResponse {
                success: true,
                topic: request.topic,
                explanation,
                timestamp: chrono::Utc::now().to_rfc3339(),
                error: None,
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Explanation endpoint error");
            Ok(Json(ExplanationResponse {
                success: false,
                topic: request.topic,
                explanation: String::new(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                error: Some(e.to_string()),
            }))
        }
    }
}
