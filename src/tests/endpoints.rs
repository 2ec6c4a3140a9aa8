//! HTTP surface tests driving the axum router with mock providers.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use super::support::*;
use crate::app::create_app;
use crate::domain::status::StatusBoard;

async fn send(harness: &Harness, request: Request<Body>) -> (StatusCode, Value) {
    let app = create_app(harness.state());
    let response = app.oneshot(request).await.expect("request handled");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn root_banner_lists_endpoints() {
    let harness = Harness::new();
    let (status, body) = send(&harness, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["chat"], "/chat");
    assert_eq!(body["endpoints"]["quiz_generate"], "/quiz/generate");
}

#[tokio::test]
async fn health_reports_provider_states() {
    let harness = Harness::new();
    let (status, body) = send(&harness, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["translation"], "unknown");
    assert!(body["services"]["startup_time"].is_string());
}

#[tokio::test]
async fn health_degrades_without_llm_credentials() {
    let mut harness = Harness::new();
    harness.status = Arc::new(StatusBoard::new(true, false));

    let (status, body) = send(&harness, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["moderation"], "missing_credentials");
}

#[tokio::test]
async fn status_exposes_cache_statistics() {
    let harness = Harness::new();
    let (status, body) = send(&harness, get("/status")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "operational");
    assert_eq!(body["cache"]["max_entries"], 200);
    assert_eq!(body["cache"]["total_entries"], 0);
}

#[tokio::test]
async fn cache_clear_empties_the_cache() {
    let harness = Harness::new();

    // Populate via one chat round trip
    let (status, _) = send(
        &harness,
        post_json("/chat", json!({ "message": "Hello cache" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(harness.cache.stats().total_entries, 1);

    let (status, body) = send(&harness, post_json("/cache/clear", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(harness.cache.stats().total_entries, 0);
}

#[tokio::test]
async fn chat_endpoint_runs_pipeline() {
    let harness = Harness::new();
    let (status, body) = send(
        &harness,
        post_json(
            "/chat",
            json!({ "message": "Hello, how are you today?", "user_id": "u1" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["final_approved"], true);
    assert!(body["reply"].as_str().unwrap().contains("Thanks for your message"));
    assert!(body["moderation_info"]["approved"].as_bool().unwrap());
    assert!(body.get("grading_result").is_none() || body["grading_result"].is_null());
}

#[tokio::test]
async fn chat_endpoint_rejects_empty_payload() {
    let harness = Harness::new();
    let (status, body) = send(&harness, post_json("/chat", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Empty input");
}

#[tokio::test]
async fn process_validates_input() {
    let harness = Harness::new();

    let (status, body) = send(&harness, post_json("/process", json!({ "text": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let oversized = "a".repeat(10_001);
    let (status, _) = send(&harness, post_json("/process", json!({ "text": oversized }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn process_returns_per_field_breakdown() {
    let harness = Harness::new();
    let (status, body) = send(
        &harness,
        post_json("/process", json!({ "text": "The weather is nice today." })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["original_language_code"], "en");
    assert_eq!(body["is_english"], true);
    assert_eq!(body["moderation_approved"], true);
    assert_eq!(body["final_approved"], true);
    assert!(body["processing_time_ms"].is_u64());
}

#[tokio::test]
async fn explain_validates_and_answers() {
    let harness = Harness::new();

    let (status, _) = send(&harness, post_json("/explain", json!({ "topic": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &harness,
        post_json("/explain", json!({ "topic": "gravity" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["topic"], "gravity");
    assert!(body["explanation"].as_str().unwrap().contains("gravity"));
}

#[tokio::test]
async fn explain_unavailable_without_credentials() {
    let mut harness = Harness::new();
    harness.status = Arc::new(StatusBoard::new(true, false));

    let (status, body) = send(
        &harness,
        post_json("/explain", json!({ "topic": "gravity" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn quiz_generation_validates_and_creates() {
    let harness = Harness::new();

    let (status, _) = send(
        &harness,
        post_json("/quiz/generate", json!({ "topic": "algebra", "difficulty": "extreme" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long_topic = "t".repeat(101);
    let (status, _) = send(
        &harness,
        post_json("/quiz/generate", json!({ "topic": long_topic, "difficulty": "easy" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &harness,
        post_json("/quiz/generate", json!({ "topic": "algebra", "difficulty": "Medium" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["quiz_info"]["form_id"], "form-123");
    assert_eq!(body["quiz_info"]["question_count"], 20);
    assert!(body["message"].as_str().unwrap().contains("20 questions"));
}

#[tokio::test]
async fn quiz_requirements_document_the_contract() {
    let harness = Harness::new();
    let (status, body) = send(&harness, get("/quiz/requirements")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["requirements"]["output"]["question_count"], 20);
    assert_eq!(
        body["requirements"]["difficulty_options"]["values"],
        json!(["easy", "medium", "hard"])
    );
}
