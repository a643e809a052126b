//! # Chatbot Engine
//!
//! File: cli/src/bot/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Everything that turns a user message into a reply lives here. The
//! transport layers (`commands::serve`, `commands::chat`) only translate
//! between their I/O and [`ChatEngine::respond`].
//!
//! ## Architecture
//!
//! - `knowledge`: the FAQ and topic dictionaries
//! - `analysis`: sentiment tagging and intent detection
//! - `fuzzy`: positional similarity used for typo tolerance
//! - `history`: per-user message window and generation context
//! - `generator`: delegation to a text-generation endpoint
//! - `engine`: the ordered response pipeline tying it all together
//!
//! The engine runs in one of three modes:
//!
//! | Mode         | Pipeline                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | `basic`      | keyword lookup, echo fallback                                   |
//! | `enhanced`   | intents, keywords, fuzzy match, context, sentiment-aware fallback |
//! | `generative` | intents, keywords, fuzzy match, then the language model         |
//!
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod analysis;
pub mod engine;
pub mod fuzzy;
pub mod generator;
pub mod history;
pub mod knowledge;

pub use engine::{ChatEngine, ChatReply, ReplyKind};

/// Which response pipeline the engine runs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Plain keyword lookup.
    Basic,
    /// Keyword lookup with intents, fuzzy matching, history and sentiment.
    #[default]
    Enhanced,
    /// Enhanced keyword stages with a language model as the last resort.
    Generative,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Basic => "basic",
            Mode::Enhanced => "enhanced",
            Mode::Generative => "generative",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
