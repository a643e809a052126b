//! # Chat HTTP Server Implementation
//!
//! File: cli/src/commands/serve/server_logic.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module runs the HTTP side of `chatbot serve`:
//! - Router with the JSON API and, optionally, a static web frontend
//! - Port availability checking with automatic fallback
//! - CORS and request tracing middleware
//! - Graceful shutdown handling
//!
//! ## Examples
//!
//! ```ignore
//! let config = config::load_and_merge_config(args).await?;
//! server_logic::run_server(config).await?;
//! ```
//!
use super::config::ServerConfig;
use super::handlers::{self, AppState};
use crate::bot::ChatEngine;
use crate::core::error::Result;
use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};

/// How many consecutive ports to try before giving up.
const MAX_PORT_ATTEMPTS: u8 = 10;

/// # Run HTTP Server (`run_server`)
///
/// Builds the engine, picks a free port, prints connection details and
/// serves until Ctrl+C or SIGTERM.
///
/// ## Errors
///
/// Fails if the engine cannot be built (e.g. the generator HTTP client),
/// no port is available, or the listener cannot be bound.
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let addr = find_available_port(config.host, config.port, MAX_PORT_ATTEMPTS).await?;

    let engine = ChatEngine::from_config(&config.app)?;
    let state = AppState::new(engine);
    let app = create_app(state.clone(), &config);

    println!("\n=================================================================");
    println!("🤖 Bot:               {}", state.engine.name());
    println!("🧠 Mode:              {}", state.engine.mode());
    if let Some(model) = state.engine.model_name() {
        println!("📡 Model:             {}", model);
    }
    println!("🌐 API URL:           http://localhost:{}/chat", addr.port());
    println!("⚙️  Binding to address: {}", addr);
    if let Some(dir) = &config.static_dir {
        println!("📂 Frontend from:     {}", dir.display());
    }
    println!("🔒 CORS enabled:      {}", config.enable_cors);
    println!("=================================================================\n");

    info!("Starting chat server on {}", addr);
    println!("Server starting! Press Ctrl+C to stop.");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// # Handle Shutdown Signal (`shutdown_signal`)
///
/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, initiating graceful shutdown...");
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!(
                    "Failed to install SIGTERM handler: {}. Shutdown on SIGTERM might not work.",
                    e
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// # Find Available Port (`find_available_port`)
///
/// Tries `start_port`, then the following ports, until one can be bound.
///
/// ## Arguments
///
/// * `req_host`: Address to bind on.
/// * `start_port`: First port to try.
/// * `max_attempts`: Total number of consecutive ports to try.
///
/// ## Returns
///
/// * `Result<SocketAddr>`: The first address that could be bound.
///
/// ## Errors
///
/// Returns an `Err` if every attempted port is unavailable.
async fn find_available_port(
    req_host: std::net::IpAddr,
    start_port: u16,
    max_attempts: u8,
) -> Result<SocketAddr> {
    let mut current_port = start_port;

    for attempt in 0..max_attempts {
        let addr = SocketAddr::new(req_host, current_port);

        match TcpListener::bind(addr).await {
            Ok(listener) => {
                // Free the port again; `run_server` binds it for real.
                drop(listener);

                if attempt > 0 {
                    info!(
                        "Port {} was unavailable, successfully bound to available port {}.",
                        start_port, current_port
                    );
                }
                return Ok(addr);
            }
            Err(e) => {
                // Most likely already in use.
                warn!(
                    "Attempt {}: Port {} on host {} is unavailable (Error: {}). Trying next port...",
                    attempt + 1,
                    current_port,
                    req_host,
                    e
                );
                // Stop at the top of the port range instead of overflowing.
                current_port = match current_port.checked_add(1) {
                    Some(port) => port,
                    None => break,
                };
            }
        }
    }

    anyhow::bail!(
        "Could not find an available port on host {} starting from port {} after trying {} ports.",
        req_host,
        start_port,
        max_attempts
    )
}

/// # Create Axum Application (`create_app`)
///
/// Routes the JSON API, mounts the static frontend (if any) as the
/// fallback, and applies tracing and CORS middleware.
///
/// ## Arguments
///
/// * `state`: Shared engine handed to every handler.
/// * `config`: Effective server settings (CORS flag, static directory).
///
/// ## Returns
///
/// * `Router`: The configured router, ready for `axum::serve`.
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    let cors_layer = if config.enable_cors {
        info!("CORS middleware enabled (permissive).");
        CorsLayer::permissive()
    } else {
        info!("CORS middleware disabled.");
        CorsLayer::new() // Adds no headers.
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default().include_headers(true))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut router = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/clear", post(handlers::clear))
        .route("/reset", post(handlers::reset))
        .route("/info", get(handlers::info))
        .route("/health", get(handlers::health));

    // Anything that is not an API route is looked up in the frontend directory.
    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.with_state(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer) // Tracing first.
            .layer(cors_layer), // Then CORS.
    )
}
