//! Service banner, detailed status and cache administration.

use axum::{extract::State, Json};
use serde_json::json;
use std::sync::Arc;

use crate::app::AppState;

/// API root endpoint: service banner and endpoint map.
///
/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Language Bridge API",
        "description": "AI-powered backend with intent classification for translation, \
                        content moderation, grading, and educational explanations",
        "version": env!("CARGO_PKG_VERSION"),
        "features": [
            "Multi-language translation",
            "Content moderation",
            "PDF grading with AI assessment",
            "Educational explanations",
            "Intent classification",
            "Quiz generation",
        ],
        "endpoints": {
            "health": "/health",
            "status": "/status",
            "process": "/process",
            "chat": "/chat",
            "explain": "/explain",
            "quiz_generate": "/quiz/generate",
            "quiz_requirements": "/quiz/requirements",
        },
    }))
}

/// Detailed status check with cache statistics.
///
/// GET /status
pub async fn status_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "operational",
        "services": {
            "providers": state.status.snapshot(),
            "startup_time": state.status.startup_time(),
        },
        "cache": state.cache.stats(),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Clear the response cache (admin endpoint).
///
/// POST /cache/clear
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.cache.clear();
    tracing::info!("Response cache cleared by admin request");

    Json(json!({
        "success": true,
        "message": "Cache cleared successfully",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
