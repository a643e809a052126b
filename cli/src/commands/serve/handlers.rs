//! # Chat API Handlers
//!
//! File: cli/src/commands/serve/handlers.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Axum handlers for the JSON API:
//!
//! | Route          | Body                                   | Response                          |
//! |----------------|----------------------------------------|-----------------------------------|
//! | `POST /chat`   | `{"message": "...", "user_id": "..."}` | `{"reply", "sentiment", "type", ...}` |
//! | `POST /clear`  | `{"user_id": "..."}`                   | `{"message": "..."}`              |
//! | `POST /reset`  | `{"user_id": "..."}`                   | `{"message": "..."}`              |
//! | `GET /info`    |                                        | bot name, mode, features          |
//! | `GET /health`  |                                        | liveness and uptime               |
//!
//! Every handler answers 200. Bodies are parsed leniently, one field at a
//! time: a missing or malformed body is an empty request (answered with a
//! prompt to say something), a non-string `message` is empty, and a
//! non-string `user_id` is keyed by its JSON text.
//!
use crate::bot::{ChatEngine, ChatReply, Mode};
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

const CLEARED_MESSAGE: &str = "Conversation history cleared! 🧹";
const RESET_MESSAGE: &str = "Conversation reset! Starting fresh 🔄";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(engine: ChatEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: Option<String>,
}

impl ChatRequest {
    pub fn from_body(body: &Bytes) -> Self {
        let fields = parse_body(body);
        Self {
            message: fields
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            user_id: user_key(&fields),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct UserRequest {
    pub user_id: Option<String>,
}

impl UserRequest {
    pub fn from_body(body: &Bytes) -> Self {
        Self {
            user_id: user_key(&parse_body(body)),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct StatusMessage {
    pub message: &'static str,
}

#[derive(Serialize, Debug)]
pub struct InfoResponse {
    pub bot_name: String,
    pub mode: Mode,
    pub features: Vec<String>,
    pub total_topics: usize,
    pub status: &'static str,
    pub tech: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: Mode,
    pub started_at: DateTime<Utc>,
    pub uptime_seconds: i64,
    pub active_users: usize,
    pub generator: Option<String>,
}

/// Parses a JSON object body. Anything else (empty, malformed, not an
/// object) yields no fields, so each field falls back on its own.
fn parse_body(body: &Bytes) -> Map<String, Value> {
    if body.is_empty() {
        return Map::new();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            warn!("Ignoring non-object request body: {}", other);
            Map::new()
        }
        Err(e) => {
            warn!("Ignoring malformed request body: {}", e);
            Map::new()
        }
    }
}

/// `user_id` as a history key. Non-string ids (e.g. `42`) use their JSON text.
fn user_key(fields: &Map<String, Value>) -> Option<String> {
    match fields.get("user_id")? {
        Value::Null => None,
        Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}

/// `POST /chat`
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Json<ChatReply> {
    let request = ChatRequest::from_body(&body);
    let engine = &state.engine;
    let user_id = engine.user_or_default(request.user_id.as_deref());
    Json(engine.respond(user_id, &request.message).await)
}

/// `POST /clear`: empties the caller's message window.
pub async fn clear(State(state): State<AppState>, body: Bytes) -> Json<StatusMessage> {
    let request = UserRequest::from_body(&body);
    let user_id = state.engine.user_or_default(request.user_id.as_deref());
    state.engine.history().clear(user_id).await;
    info!("Cleared history for '{}'", user_id);
    Json(StatusMessage {
        message: CLEARED_MESSAGE,
    })
}

/// `POST /reset`: forgets the caller's window and generation context.
pub async fn reset(State(state): State<AppState>, body: Bytes) -> Json<StatusMessage> {
    let request = UserRequest::from_body(&body);
    let user_id = state.engine.user_or_default(request.user_id.as_deref());
    state.engine.history().reset(user_id).await;
    info!("Reset conversation for '{}'", user_id);
    Json(StatusMessage {
        message: RESET_MESSAGE,
    })
}

/// `GET /info`
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let engine = &state.engine;
    let tech = match engine.model_name() {
        Some(model) => format!("Rust (axum + tokio) keyword engine, open-ended replies from {}", model),
        None => "Rust (axum + tokio) keyword engine, no external AI libraries".to_string(),
    };
    Json(InfoResponse {
        bot_name: format!("{} 🤖", engine.name()),
        mode: engine.mode(),
        features: engine.features(),
        total_topics: engine.knowledge().total_topics(),
        status: "online",
        tech,
        model: engine.model_name().map(str::to_string),
    })
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = &state.engine;
    Json(HealthResponse {
        status: "healthy",
        mode: engine.mode(),
        started_at: state.started_at,
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        active_users: engine.history().users().await,
        generator: engine.model_name().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bodies_are_parsed_leniently() {
        assert_eq!(ChatRequest::from_body(&Bytes::new()), ChatRequest::default());
        assert_eq!(
            ChatRequest::from_body(&Bytes::from_static(b"not json")),
            ChatRequest::default()
        );
        assert_eq!(
            ChatRequest::from_body(&Bytes::from_static(b"[1, 2]")),
            ChatRequest::default()
        );

        let ok = ChatRequest::from_body(&Bytes::from_static(
            br#"{"message": "hi", "user_id": "amy"}"#,
        ));
        assert_eq!(ok.message, "hi");
        assert_eq!(ok.user_id.as_deref(), Some("amy"));
    }

    #[test]
    fn bad_field_only_drops_that_field() {
        let numeric_user = ChatRequest::from_body(&Bytes::from_static(
            br#"{"message": "hello", "user_id": 42}"#,
        ));
        assert_eq!(numeric_user.message, "hello");
        assert_eq!(numeric_user.user_id.as_deref(), Some("42"));

        let numeric_message = ChatRequest::from_body(&Bytes::from_static(
            br#"{"message": 42, "user_id": "amy"}"#,
        ));
        assert_eq!(numeric_message.message, "");
        assert_eq!(numeric_message.user_id.as_deref(), Some("amy"));

        let null_user = UserRequest::from_body(&Bytes::from_static(br#"{"user_id": null}"#));
        assert_eq!(null_user.user_id, None);
    }
}
