use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Settings;
use crate::domain::status::StatusBoard;
use crate::middleware::request_id_layer;
use crate::routes;
use crate::services::{
    DocumentExtractor, ExplanationProvider, GradingProvider, IntentClassifier, ModerationProvider,
    QuizProvider, ResponseCache, TranslationProvider,
};

/// Shared application state
///
/// Providers are held as trait objects so tests can swap them for mocks;
/// the cache is the only cross-request mutable resource.
#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub cache: Arc<ResponseCache>,
    pub status: Arc<StatusBoard>,
    pub translator: Arc<dyn TranslationProvider>,
    pub moderator: Arc<dyn ModerationProvider>,
    pub intent: Arc<dyn IntentClassifier>,
    pub grader: Arc<dyn GradingProvider>,
    pub explainer: Arc<dyn ExplanationProvider>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub quiz: Arc<dyn QuizProvider>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Settings,
        cache: Arc<ResponseCache>,
        status: Arc<StatusBoard>,
        translator: Arc<dyn TranslationProvider>,
        moderator: Arc<dyn ModerationProvider>,
        intent: Arc<dyn IntentClassifier>,
        grader: Arc<dyn GradingProvider>,
        explainer: Arc<dyn ExplanationProvider>,
        extractor: Arc<dyn DocumentExtractor>,
        quiz: Arc<dyn QuizProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            settings,
            cache,
            status,
            translator,
            moderator,
            intent,
            grader,
            explainer,
            extractor,
            quiz,
        })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    // Build CORS layer
    let cors = build_cors_layer(&state.settings);

    // Build trace layer (use DEBUG for spans to reduce overhead at INFO level)
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    // Request ID layers
    let (set_request_id, propagate_request_id) = request_id_layer();

    // Base64 PDF uploads need a bigger body limit than the axum default
    let max_upload_bytes = state.settings.max_upload_bytes;

    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(propagate_request_id)
        .layer(trace_layer)
        .layer(set_request_id)
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    // In dev mode, use longer preflight cache to reduce OPTIONS requests
    let max_age = if settings.env.is_dev() {
        std::time::Duration::from_secs(86400)
    } else {
        std::time::Duration::from_secs(3600)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::HeaderName::from_static("x-request-id"),
        ]))
        .allow_credentials(true)
        .max_age(max_age)
}
