//! # Chatbot Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types used throughout the chatbot. Errors
//! never reach HTTP clients as non-200 responses: configuration errors stop
//! the process at startup, and generation errors are logged and turned into
//! an apology reply by the engine.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `ChatbotError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! ## Examples
//!
//! ```ignore
//! // Return a specific error type
//! if settings.history_limit == 0 {
//!     return Err(anyhow!(ChatbotError::Config("history_limit must be at least 1".into())));
//! }
//!
//! // Add context to errors using anyhow
//! let content = fs::read_to_string(&path)
//!     .with_context(|| format!("Failed to read file: {}", path.display()))?;
//! ```
//!
use thiserror::Error;

/// Custom error type for the chatbot.
#[derive(Error, Debug)]
pub enum ChatbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Inference request failed: {source}")]
    GeneratorRequest {
        #[from]
        source: reqwest::Error,
    },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let config_err = ChatbotError::Config("history_limit must be at least 1".to_string());
        assert_eq!(
            config_err.to_string(),
            "Configuration error: history_limit must be at least 1"
        );

        let generation_err = ChatbotError::Generation("endpoint returned 503".into());
        assert_eq!(
            generation_err.to_string(),
            "Generation failed: endpoint returned 503"
        );
    }

    #[test]
    fn test_error_downcast_through_anyhow() {
        let err: anyhow::Error = ChatbotError::Config("bad mode".into()).into();
        assert!(matches!(
            err.downcast_ref::<ChatbotError>(),
            Some(ChatbotError::Config(_))
        ));
    }
}
