//! # Chat HTTP Server
//!
//! File: cli/src/commands/serve/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `chatbot serve` exposes the chat engine as a JSON API over HTTP, with
//! optional hosting of a small web frontend.
//!
//! ## Architecture
//!
//! - `config.rs`: CLI arguments merged with the config file
//! - `handlers.rs`: Axum handlers and request/response bodies
//! - `server_logic.rs`: Router, middleware, port selection, shutdown
//!
//! ## Examples
//!
//! ```bash
//! chatbot serve --port 5000
//! curl -s localhost:5000/chat -H 'content-type: application/json' \
//!      -d '{"message": "hello", "user_id": "amy"}'
//! ```
//!
use crate::core::error::Result;
use tracing::info;

pub use config::ServeArgs;

/// Configuration loading and merging for the server.
pub mod config;

/// JSON API handlers.
pub mod handlers;

/// Axum-based HTTP server.
pub mod server_logic;

/// # Handle Serve Command (`handle_serve`)
///
/// Entry point for `chatbot serve`: merges configuration, then runs the
/// server until shutdown.
pub async fn handle_serve(args: ServeArgs) -> Result<()> {
    info!("Handling serve command with args: {:?}", args);

    let config = config::load_and_merge_config(args).await?;
    info!(
        "Effective server config: {}:{} (mode {}, cors {})",
        config.host, config.port, config.app.bot.mode, config.enable_cors
    );

    server_logic::run_server(config).await?;
    Ok(())
}
