mod app;
mod config;
mod domain;
mod error;
mod logging;
mod middleware;
mod pipeline;
mod routes;
mod services;
#[cfg(test)]
mod tests;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use domain::status::{ProviderState, StatusBoard};
use services::{
    FormsQuizClient, GoogleTranslator, LlmClient, LlmExplainer, LlmGrader, LlmIntentClassifier,
    LlmModerator, RemoteDocumentExtractor, ResponseCache,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = config::Settings::from_env()?;

    // Initialize logging
    logging::init_logging(&settings.env);

    tracing::info!(
        env = ?settings.env,
        server_addr = %settings.server_addr,
        "Starting language bridge backend"
    );

    // Response cache: the single cross-request mutable resource
    let cache = Arc::new(ResponseCache::new(
        settings.cache_max_entries,
        Duration::from_secs(settings.cache_ttl_seconds),
    ));

    // Provider clients. Missing credentials degrade the dependent
    // features; the process still starts and serves.
    let translator = Arc::new(GoogleTranslator::new(&settings)?);
    let llm = Arc::new(LlmClient::new(&settings)?);
    let moderator = Arc::new(LlmModerator::new(llm.clone()));
    let intent = Arc::new(LlmIntentClassifier::new(llm.clone()));
    let grader = Arc::new(LlmGrader::new(llm.clone()));
    let explainer = Arc::new(LlmExplainer::new(llm.clone(), settings.llm_explain_model.clone()));
    let extractor = Arc::new(RemoteDocumentExtractor::new(&settings)?);
    let quiz = Arc::new(FormsQuizClient::new(llm.clone(), &settings)?);

    let status = Arc::new(StatusBoard::new(translator.configured(), llm.configured()));

    if !translator.configured() {
        tracing::warn!("Translation credentials missing - translation features degraded");
    }
    if !llm.configured() {
        tracing::warn!("LLM credentials missing - moderation, grading and explanations degraded");
    }

    // Probe configured providers without blocking startup
    if translator.configured() {
        tokio::spawn({
            let translator = translator.clone();
            let status = status.clone();
            async move {
                use services::TranslationProvider;
                match translator.health_check().await {
                    Ok(()) => {
                        tracing::info!("Translation provider is healthy");
                        status.set_translation(ProviderState::Healthy);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Translation provider health check failed");
                        status.set_translation(ProviderState::Error);
                    }
                }
            }
        });
    }
    if llm.configured() {
        tokio::spawn({
            let llm = llm.clone();
            let status = status.clone();
            async move {
                match llm.health_check().await {
                    Ok(()) => {
                        tracing::info!("LLM provider is healthy");
                        status.set_llm(ProviderState::Healthy);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "LLM provider health check failed");
                        status.set_llm(ProviderState::Error);
                    }
                }
            }
        });
    }

    // Create application state
    let state = app::AppState::new(
        settings.clone(),
        cache,
        status,
        translator,
        moderator,
        intent,
        grader,
        explainer,
        extractor,
        quiz,
    );

    // Build application
    let app = app::create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("Listening on {}", settings.server_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
