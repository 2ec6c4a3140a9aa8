//! Standalone translation + moderation endpoint.

use axum::{extract::State, Json};
use std::sync::Arc;
use std::time::Instant;

use crate::app::AppState;
use crate::domain::process::{TextProcessRequest, TextProcessResponse};
use crate::error::{ApiError, ApiResult};
use crate::pipeline::stages::{ModerationStage, TranslationStage, MODERATION_MAX_CHARS};

/// Process text through translation and content moderation.
///
/// POST /process
pub async fn process_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TextProcessRequest>,
) -> ApiResult<Json<TextProcessResponse>> {
    let started = Instant::now();

    tracing::info!(user_id = %request.user_id, "Processing request");

    // Validate input
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Text input is required and cannot be empty".to_string(),
        ));
    }
    if request.text.chars().count() > MODERATION_MAX_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Text input is too long (maximum {} characters)",
            MODERATION_MAX_CHARS
        )));
    }

    let translation = TranslationStage::new(state.translator.as_ref())
        .run(&request.text)
        .await
        .map_err(|e| ApiError::Processing(e.to_string()))?;

    let moderation = ModerationStage::new(state.moderator.as_ref())
        .run(&translation.translated_text)
        .await
        .map_err(|e| ApiError::Processing(e.to_string()))?;

    let processing_time_ms = started.elapsed().as_millis() as u64;
    tracing::info!(elapsed_ms = processing_time_ms, "Processing completed");

    Ok(Json(TextProcessResponse {
        success: true,
        input_text: request.text,
        original_language: translation.detected_language,
        original_language_code: translation.detected_language_code,
        translation_confidence: translation.confidence,
        translated_text: translation.translated_text,
        is_english: translation.is_english,
        moderation_approved: moderation.approved,
        moderation_confidence: moderation.confidence,
        flagged_categories: moderation.flagged_categories,
        moderation_explanation: moderation.explanation,
        final_approved: moderation.approved,
        error: None,
        processing_time_ms,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
