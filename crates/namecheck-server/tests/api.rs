//! Router tests against an in-memory provider

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use namecheck_runtime::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, NameClassifier,
    ProviderError, RuntimeConfig, TokenUsage,
};
use namecheck_server::{create_router, AppState};

struct FixedProvider {
    reply: Result<String, ProviderError>,
    healthy: bool,
    calls: AtomicUsize,
}

#[async_trait]
impl LlmProvider for FixedProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map(|content| CompletionResponse {
            content,
            usage: TokenUsage::default(),
            model: config.model.clone(),
            stop_reason: None,
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

fn app_with(reply: Result<&str, ProviderError>) -> (Router, Arc<FixedProvider>) {
    app_with_health(reply, true)
}

fn app_with_health(
    reply: Result<&str, ProviderError>,
    healthy: bool,
) -> (Router, Arc<FixedProvider>) {
    let provider = Arc::new(FixedProvider {
        reply: reply.map(str::to_string),
        healthy,
        calls: AtomicUsize::new(0),
    });
    let classifier = NameClassifier::new(provider.clone(), RuntimeConfig::default()).unwrap();
    (create_router(AppState::new(classifier)), provider)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn predict(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn test_predict_realistic() {
    let (app, provider) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
    let (status, body) = send(app, predict(json!({"name": "  aisha KHAN"}).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "Aisha Khan", "prediction": "Realistic"}));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_predict_model_negative_with_reason() {
    let (app, _) = app_with(Ok(
        "```json\n{\"prediction\":\"Not Realistic\",\"reason\":\"common phrase\"}\n```",
    ));
    let (status, body) = send(
        app,
        predict(json!({"name": "table chair", "model": "gpt-4.1"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"name": "Table Chair", "prediction": "Not Realistic", "reason": "common phrase"})
    );
}

#[tokio::test]
async fn test_precheck_rejection_is_200_without_remote_call() {
    let (app, provider) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
    let (status, body) = send(app, predict(json!({"name": "m.ahmed"}).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "Not Realistic");
    assert_eq!(body["reason"], "Invalid dot formatting, must have spaces after dot(.)");
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_and_missing_name() {
    for payload in [json!({"name": "   "}), json!({}), json!({"model": "gpt-4.1"})] {
        let (app, provider) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
        let (status, body) = send(app, predict(payload.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "No name provided"}));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_invalid_model() {
    let (app, provider) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
    let (status, body) = send(
        app,
        predict(json!({"name": "Aisha Khan", "model": "gpt-3.5-turbo"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid model. Choose from"));
    assert!(message.contains("gpt-4.1-nano"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_json_payload() {
    for raw in ["not json", "", "[1, 2]"] {
        let (app, _) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
        let (status, body) = send(app, predict(raw)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {raw:?}");
        assert_eq!(body, json!({"error": "Invalid JSON payload"}));
    }
}

#[tokio::test]
async fn test_missing_content_type_is_invalid_payload() {
    let (app, _) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .body(Body::from(json!({"name": "Aisha"}).to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON payload");
}

#[tokio::test]
async fn test_malformed_model_reply_is_500() {
    let (app, provider) = app_with(Ok("Sure, that looks like a real name."));
    let (status, body) = send(app, predict(json!({"name": "Aisha Khan"}).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Invalid JSON response format from model"}));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_prediction_is_500() {
    let (app, _) = app_with(Ok(r#"{"prediction":"Probably"}"#));
    let (status, body) = send(app, predict(json!({"name": "Aisha Khan"}).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Invalid prediction value from model"}));
}

#[tokio::test]
async fn test_remote_failure_hides_detail() {
    let (app, _) = app_with(Err(ProviderError::ApiError {
        status: 503,
        message: "upstream overloaded".to_string(),
    }));
    let (status, body) = send(app, predict(json!({"name": "Aisha Khan"}).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Remote model call failed"}));
}

#[tokio::test]
async fn test_health_and_models() {
    let (app, _) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "ok", "provider": "fixed", "default_model": "gpt-4o-mini"})
    );

    let (app, _) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
    let request = Request::builder().uri("/models").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default"], "gpt-4o-mini");
    assert_eq!(body["allowed"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn test_health_degraded_when_provider_unusable() {
    let (app, provider) = app_with_health(Ok(r#"{"prediction":"Realistic"}"#), false);
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({"status": "degraded", "provider": "fixed", "default_model": "gpt-4o-mini"})
    );
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = app_with(Ok(r#"{"prediction":"Realistic"}"#));
    let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
