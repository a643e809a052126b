//! # Text Generation
//!
//! File: cli/src/bot/generator.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! In generative mode, messages that no keyword stage can answer are handed
//! to a pretrained conversational model (DialoGPT by default). The model is
//! not run in-process: [`HttpGenerator`] calls a Hugging Face style
//! text-generation endpoint.
//!
//! ## Context format
//!
//! A conversation is kept as a flat token list. Each turn contributes its
//! whitespace-separated words followed by [`END_OF_TURN`], the separator
//! DialoGPT was trained with:
//!
//! ```text
//! hello there <|endoftext|> hi! how are you? <|endoftext|> fine thanks <|endoftext|>
//! ```
//!
//! The list is capped (1000 tokens by default) by dropping the oldest tokens.
//!
use crate::core::config::GeneratorConfig;
use crate::core::error::{ChatbotError, Result};
use anyhow::Context;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Turn separator understood by DialoGPT.
pub const END_OF_TURN: &str = "<|endoftext|>";

/// Something that can continue a conversation.
pub trait Generator: Send + Sync {
    /// Identifier reported to clients in the `model` field.
    fn model_name(&self) -> &str;

    /// Produces the next bot turn for the rendered conversation `prompt`.
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Splits a turn into context tokens, terminated by [`END_OF_TURN`].
pub fn turn_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(str::to_string)
        .chain(std::iter::once(END_OF_TURN.to_string()))
        .collect()
}

pub fn render_prompt(tokens: &[String]) -> String {
    tokens.join(" ")
}

/// Strips separators the model echoed back and surrounding whitespace.
pub fn clean_reply(text: &str) -> String {
    text.replace(END_OF_TURN, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Serialize, Debug)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct GenerationParameters {
    max_new_tokens: u32,
    do_sample: bool,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    return_full_text: bool,
}

#[derive(Deserialize, Debug)]
struct GeneratedText {
    generated_text: String,
}

/// Calls a remote text-generation endpoint with a fixed sampling configuration.
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    token: Option<String>,
    parameters: GenerationParameters,
}

impl HttpGenerator {
    /// Builds a generator from the `[generator]` config section.
    ///
    /// ## Errors
    ///
    /// Fails when no endpoint is configured or the HTTP client cannot be built.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            ChatbotError::Config("generator.endpoint is not set".to_string())
        })?;
        let token = config
            .api_token_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|t| !t.trim().is_empty());
        if token.is_none() {
            debug!("No API token found for the generator; sending unauthenticated requests.");
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for the generator")?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            token,
            parameters: GenerationParameters {
                max_new_tokens: config.max_new_tokens,
                do_sample: true,
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
                return_full_text: false,
            },
        })
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: self.parameters.clone(),
        };
        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ChatbotError::from)?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("Generator endpoint returned {}: {}", status, text);
            return Err(ChatbotError::Generation(format!(
                "endpoint returned {}: {}",
                status, text
            ))
            .into());
        }

        let generated: Vec<GeneratedText> = response.json().await.map_err(ChatbotError::from)?;
        let first = generated
            .into_iter()
            .next()
            .ok_or_else(|| ChatbotError::Generation("endpoint returned no candidates".to_string()))?;
        Ok(first.generated_text)
    }
}

impl Generator for HttpGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.request(prompt))
    }
}
