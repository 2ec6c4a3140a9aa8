//! Quiz generation endpoints.

use axum::{extract::State, Json};
use serde_json::json;
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::quiz::{
    Difficulty, QuizGenerationRequest, QuizGenerationResponse, QuizRequirements,
    QUIZ_QUESTION_TARGET, QUIZ_TOPIC_MAX_CHARS,
};
use crate::error::{ApiError, ApiResult};

/// Generate a quiz on the external forms platform.
///
/// POST /quiz/generate
pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QuizGenerationRequest>,
) -> ApiResult<Json<QuizGenerationResponse>> {
    tracing::info!(
        user_id = %request.user_id,
        topic = %request.topic,
        difficulty = %request.difficulty,
        "Quiz generation request"
    );

    // Validate input
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::BadRequest(
            "Topic is required and cannot be empty".to_string(),
        ));
    }
    if topic.chars().count() > QUIZ_TOPIC_MAX_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Topic must be {} characters or less",
            QUIZ_TOPIC_MAX_CHARS
        )));
    }
    let difficulty: Difficulty = request
        .difficulty
        .parse()
        .map_err(ApiError::BadRequest)?;

    match state.quiz.create_quiz(topic, difficulty).await {
        Ok(quiz_info) => {
            tracing::info!(form_id = %quiz_info.form_id, "Quiz generated");

            let message = if quiz_info.question_count >= QUIZ_QUESTION_TARGET {
                format!(
                    "Quiz successfully created! {} questions generated.",
                    quiz_info.question_count
                )
            } else {
                format!(
                    "Quiz successfully created! {} questions generated (filtered from AI output \
                     to ensure quality).",
                    quiz_info.question_count
                )
            };

            Ok(Json(QuizGenerationResponse {
                success: true,
                quiz_info: Some(quiz_info),
                message: Some(message),
                error: None,
                details: None,
                timestamp: chrono::Utc::now().to_rfc3339(),
            }))
        }
        Err(e) => {
            tracing::error!(error = %e, "Quiz generation failed");
            Ok(Json(QuizGenerationResponse {
                success: false,
                quiz_info: None,
                message: None,
                error: Some("Quiz generation failed".to_string()),
                details: Some(vec![e.to_string()]),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }))
        }
    }
}

/// Get the requirements and specifications for quiz generation.
///
/// GET /quiz/requirements
pub async fn quiz_requirements() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "requirements": QuizRequirements::current(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
