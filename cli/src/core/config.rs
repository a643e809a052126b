//! # Chatbot Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module implements configuration loading and validation for the
//! chatbot. The same `Config` is shared by the `serve` and `chat` commands;
//! command-line flags are layered on top by each command.
//!
//! ## Architecture
//!
//! Configuration sources:
//! 1. An explicit `--config <path>` argument. When given, it is the only file read.
//! 2. Project-specific `.chatbot.toml` in the current directory or ancestors
//!    (the search stops at a directory containing `.git`)
//! 3. User-specific `<config dir>/chatbot/config.toml`
//! 4. Default values defined in the code
//!
//! Without an explicit file, the project file is merged over the user file:
//! a project value wins when it differs from the built-in default, a
//! knowledge list wins when it is non-empty.
//!
//! ## Examples
//!
//! ```toml
//! [server]
//! port = 5000
//! static_dir = "~/chatbot/frontend"
//!
//! [bot]
//! name = "Rusty-Bot"
//! mode = "generative"
//! history_limit = 5
//!
//! [generator]
//! endpoint = "https://api-inference.huggingface.co/models/microsoft/DialoGPT-medium"
//! api_token_env = "HF_API_TOKEN"
//!
//! [[knowledge.topics]]
//! keyword = "rust"
//! reply = "Rust is a systems language focused on safety and speed."
//! ```
//!
use crate::bot::{fuzzy, Mode};
use crate::core::error::{ChatbotError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Name of the project-level configuration file.
pub const PROJECT_CONFIG_FILENAME: &str = ".chatbot.toml";

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// `[server]` section, consumed by `chatbot serve`.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub port: u16,
    pub host: IpAddr,
    pub enable_cors: bool,
    /// Directory holding a web frontend to serve next to the API (can use ~).
    pub static_dir: Option<String>,
}

/// `[bot]` section: engine behaviour shared by every command.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    pub name: String,
    pub mode: Mode,
    /// Size of the per-user message window.
    pub history_limit: usize,
    /// Minimum fuzzy score (0-100) a typo match has to beat.
    pub fuzzy_threshold: f64,
    /// User id assumed when a request carries none.
    pub default_user_id: String,
}

/// `[generator]` section: the text-generation endpoint used in generative mode.
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub endpoint: Option<String>,
    pub model: String,
    /// Name of the environment variable holding the bearer token.
    pub api_token_env: Option<String>,
    /// Cap on the per-user generation context, in tokens.
    pub max_history_tokens: usize,
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub timeout_secs: u64,
}

/// Extra knowledge entries layered over the built-in dictionaries.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct KnowledgeConfig {
    #[serde(default)]
    pub faq: Vec<EntryConfig>,
    #[serde(default)]
    pub topics: Vec<EntryConfig>,
}

/// A single `keyword = reply` pair from the config file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EntryConfig {
    pub keyword: String,
    pub reply: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: 5000,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            enable_cors: true,
            static_dir: None,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "Rusty-Bot".to_string(),
            mode: Mode::Enhanced,
            history_limit: 5,
            fuzzy_threshold: fuzzy::DEFAULT_THRESHOLD,
            default_user_id: "default_user".to_string(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "microsoft/DialoGPT-medium".to_string(),
            api_token_env: Some("HF_API_TOKEN".to_string()),
            max_history_tokens: 1000,
            max_new_tokens: 60,
            temperature: 0.7,
            top_k: 50,
            top_p: 0.95,
            timeout_secs: 30,
        }
    }
}

/// # Load Configuration (`load_config`)
///
/// Loads, merges, expands and validates the configuration.
///
/// ## Arguments
///
/// * `explicit`: A file named on the command line. It must exist and
///   replaces the project/user lookup.
///
/// ## Returns
///
/// * `Result<Config>`: The validated configuration.
///
/// ## Errors
///
/// Fails when a file cannot be read or parsed, or the result is invalid.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            load_config_from_path(path)?
        }
        None => {
            // Missing files are fine here; defaults fill the gaps.
            let user_config = load_user_config()?;
            let project_config = load_project_config()?;
            merge_configs(user_config.unwrap_or_default(), project_config)
        }
    };
    // `~` in paths is expanded before validation checks the directory.
    expand_config_paths(&mut config).context("Failed to expand paths in configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", config);
    Ok(config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "Chatbot", "chatbot") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    match find_project_config_path(&current_dir) {
        Some(path) => {
            info!("Loading project configuration from: {}", path.display());
            load_config_from_path(&path).map(Some)
        }
        None => {
            debug!("No {} found in current directory or ancestors.", PROJECT_CONFIG_FILENAME);
            Ok(None)
        }
    }
}

/// Walks from `start` upward looking for `.chatbot.toml`, stopping at a `.git` directory.
fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project value if it was changed from the default, user value otherwise.
fn prefer<T: PartialEq>(project: T, user: T, default: T) -> T {
    if project != default {
        project
    } else {
        user
    }
}

/// Layers the project config over the user config, field by field.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project = match project {
        Some(p) => p,
        None => return user,
    };
    let defaults = Config::default();

    let server = ServerSection {
        port: prefer(project.server.port, user.server.port, defaults.server.port),
        host: prefer(project.server.host, user.server.host, defaults.server.host),
        enable_cors: prefer(
            project.server.enable_cors,
            user.server.enable_cors,
            defaults.server.enable_cors,
        ),
        static_dir: prefer(
            project.server.static_dir,
            user.server.static_dir,
            defaults.server.static_dir,
        ),
    };

    let bot = BotConfig {
        name: prefer(project.bot.name, user.bot.name, defaults.bot.name),
        mode: prefer(project.bot.mode, user.bot.mode, defaults.bot.mode),
        history_limit: prefer(
            project.bot.history_limit,
            user.bot.history_limit,
            defaults.bot.history_limit,
        ),
        fuzzy_threshold: prefer(
            project.bot.fuzzy_threshold,
            user.bot.fuzzy_threshold,
            defaults.bot.fuzzy_threshold,
        ),
        default_user_id: prefer(
            project.bot.default_user_id,
            user.bot.default_user_id,
            defaults.bot.default_user_id,
        ),
    };

    let (p, u, d) = (project.generator, user.generator, defaults.generator);
    let generator = GeneratorConfig {
        endpoint: prefer(p.endpoint, u.endpoint, d.endpoint),
        model: prefer(p.model, u.model, d.model),
        api_token_env: prefer(p.api_token_env, u.api_token_env, d.api_token_env),
        max_history_tokens: prefer(
            p.max_history_tokens,
            u.max_history_tokens,
            d.max_history_tokens,
        ),
        max_new_tokens: prefer(p.max_new_tokens, u.max_new_tokens, d.max_new_tokens),
        temperature: prefer(p.temperature, u.temperature, d.temperature),
        top_k: prefer(p.top_k, u.top_k, d.top_k),
        top_p: prefer(p.top_p, u.top_p, d.top_p),
        timeout_secs: prefer(p.timeout_secs, u.timeout_secs, d.timeout_secs),
    };

    // Lists are not merged entry by entry: a non-empty project list replaces the user's.
    let knowledge = KnowledgeConfig {
        faq: if project.knowledge.faq.is_empty() {
            user.knowledge.faq
        } else {
            project.knowledge.faq
        },
        topics: if project.knowledge.topics.is_empty() {
            user.knowledge.topics
        } else {
            project.knowledge.topics
        },
    };

    Config {
        server,
        bot,
        generator,
        knowledge,
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(dir) = config.server.static_dir.as_mut() {
        *dir = shellexpand::tilde(dir.as_str()).into_owned();
        debug!("Expanded static directory: {}", dir);
    }
    Ok(())
}

/// Checks the invariants the engine relies on.
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating configuration...");
    let bot = &config.bot;
    if bot.history_limit == 0 {
        return Err(anyhow!(ChatbotError::Config(
            "bot.history_limit must be at least 1".to_string()
        )));
    }
    if !(0.0..=100.0).contains(&bot.fuzzy_threshold) {
        return Err(anyhow!(ChatbotError::Config(format!(
            "bot.fuzzy_threshold must be between 0 and 100, got {}",
            bot.fuzzy_threshold
        ))));
    }
    if bot.default_user_id.trim().is_empty() {
        return Err(anyhow!(ChatbotError::Config(
            "bot.default_user_id cannot be empty".to_string()
        )));
    }
    if config.generator.max_history_tokens == 0 {
        return Err(anyhow!(ChatbotError::Config(
            "generator.max_history_tokens must be at least 1".to_string()
        )));
    }
    if bot.mode == Mode::Generative && config.generator.endpoint.is_none() {
        return Err(anyhow!(ChatbotError::Config(
            "generative mode requires generator.endpoint to be set".to_string()
        )));
    }
    for entry in config.knowledge.faq.iter().chain(&config.knowledge.topics) {
        if entry.keyword.trim().is_empty() || entry.reply.trim().is_empty() {
            return Err(anyhow!(ChatbotError::Config(format!(
                "Knowledge entries need a keyword and a reply (keyword: '{}').",
                entry.keyword
            ))));
        }
    }
    if let Some(dir) = &config.server.static_dir {
        let path = PathBuf::from(dir);
        if !path.exists() {
            warn!("Configured static directory '{}' does not exist.", path.display());
        } else if !path.is_dir() {
            return Err(anyhow!(ChatbotError::Config(format!(
                "Configured static path '{}' exists but is not a directory.",
                path.display()
            ))));
        }
    }
    Ok(())
}
