//! HttpGenerator tests against an in-process API stub

use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use taxon_classifiers::{
    CategoryClassifier, GeneratorConfig, HttpGenerator, ModelClassifier, Provider, TextGenerator,
};
use taxon_core::{Error, LeafCategory, SuggestionRequest};

const REPLY: &str = "```json\n[{\"id\":\"B\",\"confidence\":0.92},{\"id\":\"nope\",\"confidence\":0.5}]\n```";

async fn chat_completions(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer sk-test") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    assert_eq!(body["model"], "stub-model");
    assert_eq!(body["messages"][0]["role"], "user");

    (
        StatusCode::OK,
        Json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": REPLY},
                "finish_reason": "stop"
            }]
        })),
    )
}

async fn messages(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some("sk-test") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})));
    }
    assert!(headers.contains_key("anthropic-version"));
    assert_eq!(body["max_tokens"], 512);

    (
        StatusCode::OK,
        Json(json!({"content": [{"type": "text", "text": REPLY}]})),
    )
}

async fn overloaded() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "overloaded")
}

async fn spawn_stub() -> SocketAddr {
    let app = Router::new()
        .route("/v1/chat/completions", post(chat_completions))
        .route("/v1/messages", post(messages))
        .route("/down/chat/completions", post(overloaded));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn config(provider: Provider, base_url: String) -> GeneratorConfig {
    let mut config = GeneratorConfig::new(provider, "stub-model");
    config.base_url = Some(base_url);
    config.api_key = Some("sk-test".to_string());
    config
}

fn leaves() -> Vec<LeafCategory> {
    vec![LeafCategory {
        id: "B".to_string(),
        name: "Eletricidade".to_string(),
        path: "Casa → Eletricidade".to_string(),
    }]
}

#[tokio::test]
async fn test_openai_round_trip() {
    let addr = spawn_stub().await;
    let generator =
        HttpGenerator::new(config(Provider::OpenAi, format!("http://{}/v1", addr))).unwrap();

    let text = generator.generate("classify this").await.unwrap();
    assert_eq!(text, REPLY);
}

#[tokio::test]
async fn test_anthropic_round_trip() {
    let addr = spawn_stub().await;
    let generator =
        HttpGenerator::new(config(Provider::Anthropic, format!("http://{}/v1", addr))).unwrap();

    let text = generator.generate("classify this").await.unwrap();
    assert_eq!(text, REPLY);
}

#[tokio::test]
async fn test_wrong_key_is_generator_error() {
    let addr = spawn_stub().await;
    let mut config = config(Provider::OpenAi, format!("http://{}/v1", addr));
    config.api_key = Some("sk-wrong".to_string());
    let generator = HttpGenerator::new(config).unwrap();

    let err = generator.generate("classify this").await.unwrap_err();
    match err {
        Error::Generator(msg) => assert!(msg.contains("401")),
        other => panic!("Expected generator error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_2xx_collapses_to_empty_suggestions() {
    let addr = spawn_stub().await;
    let classifier = ModelClassifier::from_config(
        config(Provider::OpenAi, format!("http://{}/down", addr)),
        Duration::from_secs(5),
    )
    .unwrap();

    let request = SuggestionRequest::new("Preciso de um eletricista", "");
    assert!(classifier.classify(&request, &leaves()).await.is_empty());
}

#[tokio::test]
async fn test_unreachable_endpoint_collapses_to_empty_suggestions() {
    // Bind and drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let classifier = ModelClassifier::from_config(
        config(Provider::OpenAi, format!("http://{}/v1", addr)),
        Duration::from_secs(5),
    )
    .unwrap();

    let request = SuggestionRequest::new("Preciso de um eletricista", "");
    assert!(classifier.classify(&request, &leaves()).await.is_empty());
}

#[tokio::test]
async fn test_model_classifier_over_http() {
    let addr = spawn_stub().await;
    let classifier = ModelClassifier::from_config(
        config(Provider::OpenAi, format!("http://{}/v1", addr)),
        Duration::from_secs(5),
    )
    .unwrap();

    let request = SuggestionRequest::new("Preciso de um eletricista", "Tomada avariada em casa");
    let suggestions = classifier.classify(&request, &leaves()).await;

    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].id, "B");
    assert_eq!(suggestions[0].path, "Casa → Eletricidade");
    assert_eq!(suggestions[0].confidence, 0.92);
}
