//! Chat endpoint: the full translate → moderate → route → act pipeline.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::chat::{ChatRequest, ChatResponse};
use crate::middleware::request_id::get_request_id;
use crate::pipeline::ChatOrchestrator;

/// Intelligent chat endpoint with intent classification, grading and
/// explanations, backed by the response cache for offline resilience.
///
/// POST /chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    tracing::info!(
        user_id = %request.user_id,
        session_id = request.session_id.as_deref().unwrap_or("-"),
        request_id = get_request_id(&headers).unwrap_or("-"),
        "Chat request received"
    );

    let orchestrator = ChatOrchestrator::new(
        state.translator.clone(),
        state.moderator.clone(),
        state.intent.clone(),
        state.grader.clone(),
        state.explainer.clone(),
        state.extractor.clone(),
        state.cache.clone(),
        state.status.clone(),
    );

    Json(orchestrator.run(request).await)
}
