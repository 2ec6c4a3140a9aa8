pub mod chat;
pub mod explain;
pub mod health;
pub mod process;
pub mod quiz;
pub mod status;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Introspection
        .route("/", get(status::root))
        .route("/health", get(health::health_check))
        .route("/status", get(status::status_check))
        // Core pipeline
        .route("/chat", post(chat::chat))
        .route("/process", post(process::process_text))
        .route("/explain", post(explain::explain_topic))
        // Quiz generation
        .route("/quiz/generate", post(quiz::generate_quiz))
        .route("/quiz/requirements", get(quiz::quiz_requirements))
        // Admin
        .route("/cache/clear", post(status::clear_cache))
}
