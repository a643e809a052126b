//! # Conversation History
//!
//! File: cli/src/bot/history.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Per-user conversation state, kept in memory for the lifetime of the
//! process:
//! - a sliding window of the user's last few messages (lowercased), used
//!   for "are you still talking about ..." replies;
//! - a running token context, fed to the text generator in generative mode.
//!
//! Nothing is persisted; a restart starts every conversation fresh.
//!
//! ## Concurrency
//!
//! The store is shared between request handlers behind a `tokio::sync::RwLock`.
//! Each operation takes the lock once and never across an `.await`, so a
//! slow model call for one user does not block others.
//!
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct UserHistory {
    messages: VecDeque<String>,
    context: Vec<String>,
}

#[derive(Debug)]
pub struct HistoryStore {
    window: usize,
    max_context_tokens: usize,
    users: RwLock<HashMap<String, UserHistory>>,
}

impl HistoryStore {
    /// `window` messages per user; generation context capped at `max_context_tokens`.
    pub fn new(window: usize, max_context_tokens: usize) -> Self {
        Self {
            window: window.max(1),
            max_context_tokens: max_context_tokens.max(1),
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Appends a message to the user's window, dropping the oldest entries
    /// beyond the limit, and returns the window.
    pub async fn record(&self, user_id: &str, message: &str) -> Vec<String> {
        let mut users = self.users.write().await;
        let history = users.entry(user_id.to_string()).or_default();
        history.messages.push_back(message.to_lowercase());
        while history.messages.len() > self.window {
            history.messages.pop_front();
        }
        history.messages.iter().cloned().collect()
    }

    /// The user's message window, oldest first. Empty for unknown users.
    pub async fn messages(&self, user_id: &str) -> Vec<String> {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|h| h.messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Empties one user's message window. Unknown users are left untouched.
    pub async fn clear(&self, user_id: &str) {
        if let Some(history) = self.users.write().await.get_mut(user_id) {
            history.messages.clear();
            debug!("Cleared message window for '{}'", user_id);
        }
    }

    /// The user's generation context.
    pub async fn context(&self, user_id: &str) -> Vec<String> {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|h| h.context.clone())
            .unwrap_or_default()
    }

    /// Replaces the user's generation context, keeping only the newest tokens.
    pub async fn store_context(&self, user_id: &str, mut tokens: Vec<String>) {
        truncate_front(&mut tokens, self.max_context_tokens);
        self.users
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .context = tokens;
    }

    /// Forgets the user's messages and generation context.
    pub async fn reset(&self, user_id: &str) {
        if self.users.write().await.remove(user_id).is_some() {
            debug!("Reset conversation for '{}'", user_id);
        }
    }

    /// Number of user ids with any state.
    pub async fn users(&self) -> usize {
        self.users.read().await.len()
    }
}

/// Drops tokens from the front until at most `cap` remain.
pub fn truncate_front(tokens: &mut Vec<String>, cap: usize) {
    if tokens.len() > cap {
        let excess = tokens.len() - cap;
        tokens.drain(..excess);
    }
}
