//! Integration tests
//!
//! Drive the full router end-to-end with mocked identity and vendor servers

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use geollmproxy::config::{
    AnthropicConfig, IdentityConfig, LoggingConfig, OpenAIConfig, SecurityConfig, ServerConfig,
    Settings,
};
use geollmproxy::handlers::create_router;
use httpmock::prelude::*;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Build settings pointing every collaborator at mock servers
fn test_settings(identity: &MockServer, openai: &MockServer, anthropic: &MockServer) -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8084,
        },
        openai: OpenAIConfig {
            api_key: "sk-test-openai-key".to_string(),
            base_url: format!("{}/v1", openai.base_url()),
            timeout: 5,
        },
        anthropic: AnthropicConfig {
            api_key: "sk-ant-test-key".to_string(),
            base_url: anthropic.base_url(),
            timeout: 5,
        },
        identity: IdentityConfig {
            base_url: identity.base_url(),
            anon_key: "anon-test-key".to_string(),
            timeout: 5,
        },
        security: SecurityConfig {
            allowed_origins: vec!["*".to_string()],
            cors_enabled: true,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            format: "text".to_string(),
        },
    }
}

async fn test_app(
    identity: &MockServer,
    openai: &MockServer,
    anthropic: &MockServer,
) -> Router {
    create_router(test_settings(identity, openai, anthropic))
        .await
        .expect("Failed to create router")
}

/// Register a passing identity check for the standard test token
async fn mock_identity_ok(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/auth/v1/user")
                .header("authorization", "Bearer test-token");
            then.status(200)
                .json_body(json!({"id": "user-1", "email": "geo@example.com"}));
        })
        .await
}

/// POST a JSON body to /llm, optionally with a bearer token
async fn post_llm(app: Router, token: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/llm")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let response = app
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    let app = test_app(&identity, &openai, &anthropic).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["service"], "LLM Proxy");
}

#[tokio::test]
async fn test_preflight_skips_auth() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    let app = test_app(&identity, &openai, &anthropic).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/llm")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_preflight_on_any_path() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    let app = test_app(&identity, &openai, &anthropic).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/anything/else")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_auth_makes_no_vendor_call() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;

    let anthropic_mock = anthropic
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({}));
        })
        .await;
    let openai_mock = openai
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({}));
        })
        .await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(
        app,
        None,
        r#"{"action": "complete", "prompt": "hi", "modelId": "claude-3-sonnet"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert!(body["details"].is_string());
    assert_eq!(anthropic_mock.hits_async().await, 0);
    assert_eq!(openai_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_rejected_token_returns_unauthorized() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;

    identity
        .mock_async(|when, then| {
            when.method(GET).path("/auth/v1/user");
            then.status(401).json_body(json!({"message": "invalid token"}));
        })
        .await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(
        app,
        Some("expired-token"),
        r#"{"action": "models"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn test_malformed_json_body() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(app, Some("test-token"), r#"{"action":"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid JSON"));
    assert!(body["errorPosition"].is_u64());
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_unknown_action() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(app, Some("test-token"), r#"{"action": "summon"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid action"));
}

#[tokio::test]
async fn test_missing_required_parameters() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(
        app,
        Some("test-token"),
        r#"{"action": "complete", "prompt": "no model id"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("Missing required parameters"));
}

#[tokio::test]
async fn test_claude_completion_scenario() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    let anthropic_mock = anthropic
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({
                "id": "msg_123",
                "type": "message",
                "role": "assistant",
                "model": "claude-3-sonnet-20240229",
                "content": [{"type": "text", "text": "Plate tectonics is..."}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 10, "output_tokens": 20}
            }));
        })
        .await;
    let openai_mock = openai
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({}));
        })
        .await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(
        app,
        Some("test-token"),
        r#"{
            "action": "complete",
            "prompt": "Summarize plate tectonics",
            "modelId": "claude-3-sonnet-20240229",
            "temperature": 0.5,
            "maxTokens": 500
        }"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Plate tectonics is...");
    assert_eq!(body["usage"]["promptTokens"], 10);
    assert_eq!(body["usage"]["completionTokens"], 20);
    assert_eq!(body["usage"]["totalTokens"], 30);

    assert_eq!(anthropic_mock.hits_async().await, 1);
    assert_eq!(openai_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_openai_completion_dispatch() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    let anthropic_mock = anthropic
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).json_body(json!({}));
        })
        .await;
    let openai_mock = openai
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Orogeny is mountain building."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 8, "completion_tokens": 6, "total_tokens": 14}
            }));
        })
        .await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(
        app,
        Some("test-token"),
        r#"{"action": "complete", "prompt": "Explain orogeny", "modelId": "gpt-4"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Orogeny is mountain building.");
    assert_eq!(body["usage"]["totalTokens"], 14);

    assert_eq!(anthropic_mock.hits_async().await, 0);
    assert_eq!(openai_mock.hits_async().await, 1);
}

#[tokio::test]
async fn test_documents_reach_the_vendor() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    let anthropic_mock = anthropic
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .body_contains("Document 1: field-notes.txt")
                .body_contains("User request: Check my terminology");
            then.status(200).json_body(json!({
                "id": "msg_456",
                "type": "message",
                "role": "assistant",
                "model": "claude-3-sonnet-20240229",
                "content": [{"type": "text", "text": "Looks consistent."}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 40, "output_tokens": 5}
            }));
        })
        .await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(
        app,
        Some("test-token"),
        r#"{
            "action": "complete",
            "prompt": "Check my terminology",
            "modelId": "claude-3-sonnet-20240229",
            "documents": [{"name": "field-notes.txt", "content": "andesitic lava flows"}]
        }"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Looks consistent.");
    assert_eq!(anthropic_mock.hits_async().await, 1);
}

#[tokio::test]
async fn test_vendor_error_propagates() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    anthropic
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(529).json_body(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            }));
        })
        .await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(
        app,
        Some("test-token"),
        r#"{"action": "complete", "prompt": "hi", "modelId": "claude-3-sonnet"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("529"));
    assert!(message.contains("Overloaded"));
}

#[tokio::test]
async fn test_models_partial_failure_returns_other_vendor() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    anthropic
        .mock_async(|when, then| {
            when.method(GET).path("/v1/models");
            then.status(500).body("internal error");
        })
        .await;
    openai
        .mock_async(|when, then| {
            when.method(GET).path("/v1/models");
            then.status(200).json_body(json!({
                "object": "list",
                "data": [
                    {"id": "gpt-4", "object": "model"},
                    {"id": "gpt-3.5-turbo-instruct", "object": "model"},
                    {"id": "dall-e-3", "object": "model"}
                ]
            }));
        })
        .await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(app, Some("test-token"), r#"{"action": "models"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["id"], "gpt-4");
    assert_eq!(models[0]["provider"], "openai");
}

#[tokio::test]
async fn test_models_concatenates_anthropic_first() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    mock_identity_ok(&identity).await;

    anthropic
        .mock_async(|when, then| {
            when.method(GET).path("/v1/models");
            then.status(200).json_body(json!({
                "data": [
                    {"id": "claude-3-sonnet-20240229", "display_name": "Claude 3 Sonnet"},
                    {"id": "claude-2.1"}
                ]
            }));
        })
        .await;
    openai
        .mock_async(|when, then| {
            when.method(GET).path("/v1/models");
            then.status(200).json_body(json!({
                "object": "list",
                "data": [{"id": "gpt-4", "object": "model"}]
            }));
        })
        .await;

    let app = test_app(&identity, &openai, &anthropic).await;
    let (status, body) = post_llm(app, Some("test-token"), r#"{"action": "models"}"#).await;

    assert_eq!(status, StatusCode::OK);
    let models = body["models"].as_array().unwrap();
    // claude-2.1 is filtered out as an older generation
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["provider"], "anthropic");
    assert_eq!(models[0]["name"], "Claude 3 Sonnet");
    assert_eq!(models[0]["maxTokens"], 200000);
    assert_eq!(models[1]["provider"], "openai");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let identity = MockServer::start_async().await;
    let openai = MockServer::start_async().await;
    let anthropic = MockServer::start_async().await;
    let app = test_app(&identity, &openai, &anthropic).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
