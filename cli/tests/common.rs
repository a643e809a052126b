//! # Chatbot Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`: a handle on the
//! compiled binary, an in-process router, and small request/response helpers.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chatbot::bot::ChatEngine;
use chatbot::commands::serve::config::ServerConfig;
use chatbot::commands::serve::handlers::AppState;
use chatbot::commands::serve::server_logic::create_app;
use chatbot::core::config::Config;
use chrono::Utc;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

/// # Get Chatbot Command (`chatbot_cmd`)
///
/// An `assert_cmd::Command` for the `chatbot` binary built for this test run.
pub fn chatbot_cmd() -> Command {
    Command::cargo_bin("chatbot").expect("Failed to find chatbot binary for testing")
}

/// Writes `contents` to a temporary TOML file; keep the handle alive while it is used.
pub fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp config");
    file
}

/// Router backed by a fresh engine built from `config`.
pub fn app_with(config: &Config) -> Router {
    app_with_engine(ChatEngine::new(config))
}

pub fn app_with_engine(engine: ChatEngine) -> Router {
    create_app(AppState::new(engine), &ServerConfig::default())
}

/// Router over an engine the test keeps a handle on, to inspect its history.
pub fn app_sharing(engine: Arc<ChatEngine>) -> Router {
    let state = AppState {
        engine,
        started_at: Utc::now(),
    };
    create_app(state, &ServerConfig::default())
}

/// Router with the default configuration.
pub fn app() -> Router {
    app_with(&Config::default())
}

/// Sends one request through the router and returns status and JSON body.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router returned an error");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// `POST /chat` with a message and user id.
pub async fn chat(app: &Router, user_id: &str, message: &str) -> Value {
    let body = serde_json::json!({ "message": message, "user_id": user_id }).to_string();
    let (status, json) = send(app, "POST", "/chat", Some(&body)).await;
    assert_eq!(status, StatusCode::OK);
    json
}
