//! Unified API error handling
//!
//! Provides consistent error responses across all endpoints, plus the
//! stage-level error taxonomy used by the chat pipeline.

#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Processing(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Processing(_) => "PROCESSING_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::ServiceUnavailable(msg) => msg.clone(),
            Self::Processing(msg) => format!("Processing failed: {}", msg),
            // Don't leak internal error details
            Self::Internal(_) => "An internal error occurred".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log internal errors
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, "Internal server error");
            }
            _ => {
                tracing::warn!(error = %self, "API error");
            }
        }

        let status = self.status_code();
        let body = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.public_message(),
            request_id: None, // Will be populated by middleware if available
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure taxonomy for the chat pipeline stages.
///
/// Each stage returns `StageResult` so the orchestrator pattern-matches on
/// failures instead of unwinding. Failures before moderation abort the
/// run with a generic user-facing message; failures after approval degrade
/// only the feature that failed.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("input text is empty or contains only whitespace")]
    EmptyInput,

    #[error("input text is too long (maximum {max} characters)")]
    InputTooLong { max: usize },

    #[error("translation failed: {0}")]
    TranslationFailed(String),

    #[error("moderation failed: {0}")]
    ModerationFailed(String),

    #[error("document is not a valid PDF")]
    DocumentInvalid,

    #[error("document text extraction failed: {0}")]
    DocumentExtractionFailed(String),

    #[error("grading failed: {0}")]
    GradingFailed(String),

    #[error("explanation service is unavailable")]
    ExplanationUnavailable,

    #[error("intent classification failed: {0}")]
    IntentClassificationFailed(String),

    #[error("chat workflow failed: {0}")]
    WorkflowFailed(String),
}

pub type StageResult<T> = Result<T, StageError>;
