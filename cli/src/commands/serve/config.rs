//! # Chat Server Configuration
//!
//! File: cli/src/commands/serve/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module merges the settings for `chatbot serve`:
//! 1. Command-line arguments (highest priority)
//! 2. The `[server]` and `[bot]` sections of the loaded config file
//! 3. Default values (lowest priority)
//!
//! A command-line value only overrides the file when it differs from the
//! flag's default, so `chatbot serve` with a config file setting
//! `port = 8080` still listens on 8080.
//!
//! ## Examples
//!
//! ```bash
//! # Defaults: 127.0.0.1:5000, enhanced mode
//! chatbot serve
//!
//! # Serve the bundled web page next to the API, on all interfaces
//! chatbot serve --host 0.0.0.0 --static-dir ./frontend
//!
//! # Delegate unmatched messages to the configured model
//! chatbot serve --mode generative --config ./chatbot.toml
//! ```
//!
use crate::bot::Mode;
use crate::core::config::{self, Config};
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr};
use std::{env, path::PathBuf};
use tracing::debug;

/// # Serve Command Arguments (`ServeArgs`)
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to listen on. The next free port is used if it is taken.
    #[arg(long, short, default_value_t = 5000)]
    pub port: u16,

    /// Address to bind. Use `0.0.0.0` to accept connections from other machines.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Disables CORS headers (enabled by default so a browser frontend can call the API).
    #[arg(long)]
    pub no_cors: bool,

    /// Directory with a web frontend to serve alongside the API.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Response pipeline; overrides `bot.mode` from the config file.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Configuration file to use instead of the discovered one.
    #[arg(long, short, env = "CHATBOT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// # Effective Server Configuration (`ServerConfig`)
///
/// The merged result of CLI arguments and the config file, with the static
/// directory resolved to an absolute path.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: IpAddr,
    pub enable_cors: bool,
    pub static_dir: Option<PathBuf>,
    /// Everything else (bot, generator, knowledge) for building the engine.
    pub app: Config,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            enable_cors: true,
            static_dir: None,
            app: Config::default(),
        }
    }
}

/// # Load and Merge Server Configuration (`load_and_merge_config`)
///
/// Loads the config file (explicit or discovered), applies command-line
/// overrides, re-validates the result and resolves the static directory.
///
/// ## Errors
///
/// Returns an error if the config file cannot be read or parsed, if the
/// merged configuration is invalid (e.g. generative mode without an
/// endpoint), or if the static directory does not exist.
pub async fn load_and_merge_config(args: ServeArgs) -> Result<ServerConfig> {
    let app = config::load_config(args.config.as_deref())?;
    merge_config(args, app).await
}

async fn merge_config(args: ServeArgs, mut app: Config) -> Result<ServerConfig> {
    let cli_defaults = ServeArgs::parse_from([""]);

    if let Some(mode) = args.mode {
        debug!("Mode overridden on the command line: {}", mode);
        app.bot.mode = mode;
    }
    config::validate_config(&app).context("Configuration validation failed")?;

    let mut effective = ServerConfig {
        port: app.server.port,
        host: app.server.host,
        enable_cors: app.server.enable_cors,
        static_dir: app.server.static_dir.as_ref().map(PathBuf::from),
        app,
    };

    // Port/host: the file wins unless the flag was set to something non-default.
    if args.port != cli_defaults.port {
        effective.port = args.port;
    }
    if args.host != cli_defaults.host {
        effective.host = args.host;
    }
    // --no-cors always wins when given.
    if args.no_cors {
        effective.enable_cors = false;
    }
    if let Some(dir) = args.static_dir {
        effective.static_dir = Some(dir);
    }

    effective.resolve_static_dir().await?;
    Ok(effective)
}

impl ServerConfig {
    /// # Resolve and Validate Static Directory (`resolve_static_dir`)
    ///
    /// Makes the static directory absolute and canonical, failing if it does
    /// not exist or is not a directory. No-op when no directory is configured.
    async fn resolve_static_dir(&mut self) -> Result<()> {
        let Some(dir) = &self.static_dir else {
            return Ok(());
        };

        let absolute_path = if dir.is_absolute() {
            dir.clone()
        } else {
            env::current_dir()
                .context("Failed to get current working directory")?
                .join(dir)
        };

        let canonical_path = tokio::fs::canonicalize(&absolute_path)
            .await
            .with_context(|| {
                format!(
                    "Static directory '{}' could not be found or accessed",
                    absolute_path.display()
                )
            })?;
        let metadata = tokio::fs::metadata(&canonical_path)
            .await
            .with_context(|| {
                format!("Failed to get metadata for '{}'", canonical_path.display())
            })?;
        if !metadata.is_dir() {
            anyhow::bail!(
                "Static path is not a directory: {}",
                canonical_path.display()
            );
        }

        self.static_dir = Some(canonical_path);
        Ok(())
    }
}
