//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;
use crate::domain::status::ServiceStatuses;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub services: HealthServices,
}

#[derive(Serialize)]
pub struct HealthServices {
    #[serde(flatten)]
    pub providers: ServiceStatuses,
    pub startup_time: String,
}

/// Health check endpoint - public.
///
/// Reports `healthy` while every provider is reachable (or still
/// unprobed) and `degraded` once any provider has failed or lacks
/// credentials. The process keeps serving either way.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: state.status.overall().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        services: HealthServices {
            providers: state.status.snapshot(),
            startup_time: state.status.startup_time().to_string(),
        },
    })
}
