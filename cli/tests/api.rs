//! # Chat API Integration Tests
//!
//! File: cli/tests/api.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Drives the axum router in-process (no sockets) and checks the JSON
//! contract of every endpoint.
//!

mod common;
use common::*;

use axum::http::StatusCode;
use chatbot::bot::generator::Generator;
use chatbot::bot::{ChatEngine, Mode};
use chatbot::core::config::Config;
use futures_util::future::BoxFuture;
use std::sync::Arc;

struct EchoModel;

impl Generator for EchoModel {
    fn model_name(&self) -> &str {
        "echo-model"
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, anyhow::Result<String>> {
        let words = prompt.split_whitespace().count();
        Box::pin(async move { Ok(format!("I have seen {} tokens so far", words)) })
    }
}

struct DeadModel;

impl Generator for DeadModel {
    fn model_name(&self) -> &str {
        "dead-model"
    }

    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, anyhow::Result<String>> {
        Box::pin(async { Err(anyhow::anyhow!("connection refused")) })
    }
}

fn generative_app(generator: Arc<dyn Generator>) -> axum::Router {
    let mut config = Config::default();
    config.bot.mode = Mode::Generative;
    app_with_engine(ChatEngine::new(&config).with_generator(generator))
}

#[tokio::test]
async fn hello_gets_greeting() {
    let app = app();
    let json = chat(&app, "amy", "hello").await;
    assert_eq!(json["reply"], "Hello! 👋 How can I assist you today?");
    assert_eq!(json["type"], "greeting");
    assert_eq!(json["sentiment"], "neutral");
}

#[tokio::test]
async fn bye_gets_farewell() {
    let app = app();
    let json = chat(&app, "amy", "bye").await;
    assert!(json["reply"].as_str().unwrap().contains("Goodbye"));
    assert_eq!(json["type"], "farewell");
}

#[tokio::test]
async fn topic_and_typo() {
    let app = app();

    let exact = chat(&app, "amy", "tell me about databases").await;
    assert_eq!(exact["type"], "knowledge");
    assert!(exact["reply"].as_str().unwrap().starts_with("Databases store"));

    let typo = chat(&app, "amy", "pythn").await;
    assert_eq!(typo["type"], "fuzzy_match");
    assert_eq!(typo["confidence"], "66%");
}

#[tokio::test]
async fn empty_or_missing_message_prompts() {
    let app = app();

    let (status, json) = send(&app, "POST", "/chat", Some(r#"{"message": "   "}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "Please say something! 😊");
    assert!(json.get("type").is_none());

    let (status, json) = send(&app, "POST", "/chat", Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "Please say something! 😊");

    let (status, json) = send(&app, "POST", "/chat", Some("this is not json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "Please say something! 😊");
}

#[tokio::test]
async fn history_window_and_clear_are_per_user() {
    let mut config = Config::default();
    config.bot.history_limit = 5;
    let state_engine = Arc::new(ChatEngine::new(&config));
    let app = app_sharing(state_engine.clone());

    for i in 0..7 {
        chat(&app, "amy", &format!("zebra fact {}", i)).await;
    }
    chat(&app, "bob", "zebra talk").await;

    let amy = state_engine.history().messages("amy").await;
    assert_eq!(amy.len(), 5);
    assert_eq!(amy.first().unwrap(), "zebra fact 2");

    let (status, json) = send(&app, "POST", "/clear", Some(r#"{"user_id": "amy"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Conversation history cleared! 🧹");

    assert!(state_engine.history().messages("amy").await.is_empty());
    assert_eq!(state_engine.history().messages("bob").await, vec!["zebra talk"]);
}

#[tokio::test]
async fn missing_user_id_uses_default() {
    let mut config = Config::default();
    config.bot.default_user_id = "guest".into();
    let engine = Arc::new(ChatEngine::new(&config));
    let app = app_sharing(engine.clone());

    send(&app, "POST", "/chat", Some(r#"{"message": "zebra"}"#)).await;
    assert_eq!(engine.history().messages("guest").await, vec!["zebra"]);

    // /reset without a body falls back to the default user too.
    let (status, json) = send(&app, "POST", "/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Conversation reset! Starting fresh 🔄");
    assert!(engine.history().messages("guest").await.is_empty());
}

#[tokio::test]
async fn numeric_user_id_keeps_the_message() {
    let engine = Arc::new(ChatEngine::new(&Config::default()));
    let app = app_sharing(engine.clone());

    let (status, json) = send(
        &app,
        "POST",
        "/chat",
        Some(r#"{"message": "hello", "user_id": 42}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["type"], "greeting");
    assert_eq!(engine.history().messages("42").await, vec!["hello"]);
    assert!(engine.history().messages("default_user").await.is_empty());

    // A non-string message is dropped on its own; the user id still counts.
    let (_, json) = send(
        &app,
        "POST",
        "/chat",
        Some(r#"{"message": ["hello"], "user_id": "amy"}"#),
    )
    .await;
    assert_eq!(json["reply"], "Please say something! 😊");
}

#[tokio::test]
async fn info_describes_the_bot() {
    let app = app();
    let (status, json) = send(&app, "GET", "/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "online");
    assert_eq!(json["mode"], "enhanced");
    assert_eq!(json["total_topics"], 18);
    assert!(json["features"].as_array().unwrap().len() >= 5);
    assert!(json.get("model").is_none());
}

#[tokio::test]
async fn health_reports_liveness() {
    let app = app();
    chat(&app, "amy", "hello").await;

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["active_users"], 1);
    assert!(json["uptime_seconds"].as_i64().unwrap() >= 0);
    assert!(json["started_at"].is_string());
}

#[tokio::test]
async fn basic_mode_returns_reply_only() {
    let mut config = Config::default();
    config.bot.mode = Mode::Basic;
    let app = app_with(&config);

    let json = chat(&app, "amy", "Quantum Zebras").await;
    assert_eq!(
        json,
        serde_json::json!({ "reply": "I didn’t fully get that 😅 but you said: quantum zebras" })
    );
}

#[tokio::test]
async fn generative_mode_reports_model() {
    let app = generative_app(Arc::new(EchoModel));

    let first = chat(&app, "amy", "zebra crossing stripes").await;
    assert_eq!(first["type"], "ai");
    assert_eq!(first["model"], "echo-model");
    // Three words plus the end-of-turn marker.
    assert_eq!(first["reply"], "I have seen 4 tokens so far");

    // The second prompt carries the first exchange.
    let second = chat(&app, "amy", "zebra again").await;
    assert_eq!(second["reply"], "I have seen 15 tokens so far");

    let (_, info) = send(&app, "GET", "/info", None).await;
    assert_eq!(info["model"], "echo-model");
    assert_eq!(info["mode"], "generative");
}

#[tokio::test]
async fn generation_failure_is_still_200() {
    let app = generative_app(Arc::new(DeadModel));
    let json = chat(&app, "amy", "zebra crossing stripes").await;
    assert_eq!(json["type"], "fallback");
    assert!(json["reply"].as_str().unwrap().starts_with("Sorry"));
}

#[tokio::test]
async fn cors_preflight_is_allowed() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/chat")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn static_dir_serves_frontend() {
    use axum::body::Body;
    use axum::http::Request;
    use chatbot::commands::serve::config::ServerConfig;
    use chatbot::commands::serve::handlers::AppState;
    use chatbot::commands::serve::server_logic::create_app;
    use tower::ServiceExt;

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>chat</h1>").unwrap();
    let config = ServerConfig {
        static_dir: Some(dir.path().to_path_buf()),
        ..ServerConfig::default()
    };
    let app = create_app(AppState::new(ChatEngine::new(&Config::default())), &config);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"<h1>chat</h1>");

    // API routes still win over the fallback.
    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}
