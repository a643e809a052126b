//! # Chat Engine
//!
//! File: cli/src/bot/engine.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! [`ChatEngine::respond`] runs a message through an ordered list of stages
//! and returns the first reply produced. The order matters: intent checks
//! come before dictionary lookups, exact lookups before fuzzy ones, and the
//! language model (generative mode) or a canned fallback comes last.
//!
//! ## Pipeline (enhanced and generative modes)
//!
//! 1. Empty message → prompt the user to say something
//! 2. Record the message in the user's window, analyse it
//! 3. Greeting (only if an FAQ keyword also matches)
//! 4. Farewell
//! 5. Gratitude
//! 6. FAQ keyword (with a note when the user sounds frustrated)
//! 7. Topic keyword
//! 8. Fuzzy keyword match (typo tolerance)
//! 9. Generative: the language model. Enhanced: context reference, then a
//!    fallback picked by question/sentiment.
//!
//! Basic mode is a single FAQ/topic lookup with an echo fallback.
//!
use super::analysis::{Analysis, Sentiment};
use super::fuzzy::fuzzy_match;
use super::generator::{clean_reply, render_prompt, turn_tokens, Generator, HttpGenerator};
use super::history::{truncate_front, HistoryStore};
use super::knowledge::KnowledgeBase;
use super::Mode;
use crate::core::config::Config;
use crate::core::error::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const EMPTY_PROMPT: &str = "Please say something! 😊";
const FAREWELL_REPLY: &str = "Goodbye! 👋 Keep learning & keep building!";
const GRATITUDE_REPLY: &str = "You're very welcome! 😊 Anything else I can help with?";
const FRUSTRATION_NOTE: &str = " (I sense you might be frustrated 😟)";
const QUESTION_FALLBACK: &str =
    "That's a great question! 🤔 I don't have that specific info yet, but I'm learning every day!";
const NEGATIVE_FALLBACK: &str =
    "I'm sorry if I couldn't help properly 😟 Can you try rephrasing your question?";
const POSITIVE_FALLBACK: &str = "Glad you're in a good mood! 😊 How else can I assist you?";
const GENERATION_APOLOGY: &str =
    "Sorry, I'm having trouble thinking right now 😅 Can you try asking another way?";

/// Words that suggest the user refers back to an earlier message.
const REFERENCE_WORDS: &[&str] = &["that", "it", "this"];
/// Context replies only fire for messages shorter than this many words.
const SHORT_REFERENCE_WORDS: usize = 6;

/// Which stage produced a reply. Serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Greeting,
    Farewell,
    Gratitude,
    Faq,
    Knowledge,
    FuzzyMatch,
    Context,
    Fallback,
    Ai,
}

/// The JSON body returned by `POST /chat`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ReplyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ChatReply {
    /// A bare reply without any classification.
    pub fn plain(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            sentiment: None,
            kind: None,
            confidence: None,
            model: None,
        }
    }

    pub fn tagged(reply: impl Into<String>, kind: ReplyKind, sentiment: Sentiment) -> Self {
        Self {
            kind: Some(kind),
            sentiment: Some(sentiment),
            ..Self::plain(reply)
        }
    }

    fn with_confidence(mut self, score: f64) -> Self {
        self.confidence = Some(format!("{}%", score as u32));
        self
    }

    fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }
}

pub struct ChatEngine {
    name: String,
    mode: Mode,
    knowledge: KnowledgeBase,
    history: HistoryStore,
    fuzzy_threshold: f64,
    max_context_tokens: usize,
    default_user_id: String,
    generator: Option<Arc<dyn Generator>>,
}

impl ChatEngine {
    /// Builds an engine without a generator. Use [`ChatEngine::from_config`]
    /// to get an HTTP generator wired in for generative mode.
    pub fn new(config: &Config) -> Self {
        let bot = &config.bot;
        let knowledge = KnowledgeBase::builtin(&bot.name)
            .with_extra(&config.knowledge.faq, &config.knowledge.topics);
        Self {
            name: bot.name.clone(),
            mode: bot.mode,
            knowledge,
            history: HistoryStore::new(bot.history_limit, config.generator.max_history_tokens),
            fuzzy_threshold: bot.fuzzy_threshold,
            max_context_tokens: config.generator.max_history_tokens,
            default_user_id: bot.default_user_id.clone(),
            generator: None,
        }
    }

    /// Builds an engine, connecting the configured generator in generative mode.
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = Self::new(config);
        if engine.mode != Mode::Generative {
            return Ok(engine);
        }
        let generator = HttpGenerator::from_config(&config.generator)?;
        info!(
            "Generative mode: delegating to '{}'",
            generator.model_name()
        );
        Ok(engine.with_generator(Arc::new(generator)))
    }

    pub fn with_generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Name of the model answering open-ended messages, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.model_name())
    }

    /// The given user id, or the configured default when absent or blank.
    pub fn user_or_default<'a>(&'a self, user_id: Option<&'a str>) -> &'a str {
        match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => &self.default_user_id,
        }
    }

    /// Human-readable capabilities of the current mode, for `GET /info`.
    pub fn features(&self) -> Vec<String> {
        let mut features = vec!["✅ Keyword answers (FAQ + study topics)".to_string()];
        if self.mode != Mode::Basic {
            features.extend([
                "✅ Typo detection (fuzzy matching)".to_string(),
                "✅ Sentiment analysis (positive/negative/neutral)".to_string(),
                "✅ Intent detection (question/greeting/farewell)".to_string(),
                format!(
                    "✅ Conversation memory (last {} messages)",
                    self.history.window()
                ),
            ]);
        }
        match self.mode {
            Mode::Enhanced => features.push("✅ Context awareness".to_string()),
            Mode::Generative => features.push(format!(
                "✅ Free-form replies from {}",
                self.model_name().unwrap_or("a language model")
            )),
            Mode::Basic => {}
        }
        features
    }

    /// Produces the reply for one message from `user_id`.
    pub async fn respond(&self, user_id: &str, message: &str) -> ChatReply {
        let reply = match self.mode {
            Mode::Basic => self.respond_basic(message),
            Mode::Enhanced | Mode::Generative => self.respond_enhanced(user_id, message).await,
        };
        debug!("Reply for '{}' ({:?}): {}", user_id, reply.kind, reply.reply);
        reply
    }

    fn respond_basic(&self, message: &str) -> ChatReply {
        let lower = message.to_lowercase();
        if let Some(entry) = self.knowledge.find_faq(&lower) {
            return ChatReply::plain(entry.reply.as_str());
        }
        if let Some(entry) = self.knowledge.find_topic(&lower) {
            return ChatReply::plain(entry.reply.as_str());
        }
        ChatReply::plain(format!("I didn’t fully get that 😅 but you said: {}", lower))
    }

    async fn respond_enhanced(&self, user_id: &str, message: &str) -> ChatReply {
        let message = message.trim();
        if message.is_empty() {
            return ChatReply::plain(EMPTY_PROMPT);
        }
        let lower = message.to_lowercase();
        let window = self.history.record(user_id, message).await;
        let analysis = Analysis::of(message);

        if let Some(reply) = self.keyword_reply(&lower, &analysis) {
            return reply;
        }

        if self.mode == Mode::Generative {
            return self.generate(user_id, message, analysis.sentiment).await;
        }

        if let Some(reply) = context_reply(message, &lower, &window, analysis.sentiment) {
            return reply;
        }
        fallback_reply(message, &analysis)
    }

    /// Intent, dictionary and fuzzy stages, in that order.
    fn keyword_reply(&self, lower: &str, analysis: &Analysis) -> Option<ChatReply> {
        let sentiment = analysis.sentiment;

        if analysis.is_greeting {
            if let Some(entry) = self.knowledge.find_faq(lower) {
                return Some(ChatReply::tagged(
                    entry.reply.as_str(),
                    ReplyKind::Greeting,
                    sentiment,
                ));
            }
        }
        if analysis.is_farewell {
            return Some(ChatReply::tagged(FAREWELL_REPLY, ReplyKind::Farewell, sentiment));
        }
        if analysis.is_gratitude {
            return Some(ChatReply::tagged(GRATITUDE_REPLY, ReplyKind::Gratitude, sentiment));
        }

        if let Some(entry) = self.knowledge.find_faq(lower) {
            let mut reply = entry.reply.clone();
            if sentiment == Sentiment::Negative {
                reply.push_str(FRUSTRATION_NOTE);
            }
            return Some(ChatReply::tagged(reply, ReplyKind::Faq, sentiment));
        }
        if let Some(entry) = self.knowledge.find_topic(lower) {
            return Some(ChatReply::tagged(
                entry.reply.as_str(),
                ReplyKind::Knowledge,
                sentiment,
            ));
        }

        // The matcher accepts scores equal to the threshold; replies need to beat it.
        let found = fuzzy_match(lower, self.knowledge.entries(), self.fuzzy_threshold)
            .filter(|m| m.score > self.fuzzy_threshold)?;
        debug!(
            "Fuzzy match '{}' -> '{}' ({:.1})",
            lower, found.entry.keyword, found.score
        );
        Some(
            ChatReply::tagged(
                format!("{} 🎯", found.entry.reply),
                ReplyKind::FuzzyMatch,
                sentiment,
            )
            .with_confidence(found.score),
        )
    }

    /// Hands the message to the language model, extending the user's context on success.
    async fn generate(&self, user_id: &str, message: &str, sentiment: Sentiment) -> ChatReply {
        let Some(generator) = self.generator.as_deref() else {
            warn!("Generative mode without a generator; replying with an apology.");
            return ChatReply::tagged(GENERATION_APOLOGY, ReplyKind::Fallback, sentiment);
        };

        let mut context = self.history.context(user_id).await;
        context.extend(turn_tokens(message));
        truncate_front(&mut context, self.max_context_tokens);
        let prompt = render_prompt(&context);

        match generator.generate(&prompt).await {
            Ok(text) => {
                let reply = clean_reply(&text);
                if reply.is_empty() {
                    warn!("Model '{}' returned an empty reply", generator.model_name());
                    return ChatReply::tagged(GENERATION_APOLOGY, ReplyKind::Fallback, sentiment)
                        .with_model(generator.model_name());
                }
                context.extend(turn_tokens(&reply));
                self.history.store_context(user_id, context).await;
                ChatReply::tagged(reply, ReplyKind::Ai, sentiment)
                    .with_model(generator.model_name())
            }
            Err(e) => {
                error!("Generation failed for '{}': {:#}", user_id, e);
                ChatReply::tagged(GENERATION_APOLOGY, ReplyKind::Fallback, sentiment)
                    .with_model(generator.model_name())
            }
        }
    }
}

/// "Still talking about ...?" for short messages that point back at the previous one.
fn context_reply(
    message: &str,
    lower: &str,
    window: &[String],
    sentiment: Sentiment,
) -> Option<ChatReply> {
    if window.len() < 2 || !REFERENCE_WORDS.iter().any(|w| lower.contains(w)) {
        return None;
    }
    if message.split_whitespace().count() >= SHORT_REFERENCE_WORDS {
        return None;
    }
    let previous = &window[window.len() - 2];
    Some(ChatReply::tagged(
        format!(
            "Still talking about '{}'? Tell me specifically what you want to know! 💬",
            previous
        ),
        ReplyKind::Context,
        sentiment,
    ))
}

fn fallback_reply(message: &str, analysis: &Analysis) -> ChatReply {
    let reply = if analysis.is_question {
        QUESTION_FALLBACK.to_string()
    } else {
        match analysis.sentiment {
            Sentiment::Negative => NEGATIVE_FALLBACK.to_string(),
            Sentiment::Positive => POSITIVE_FALLBACK.to_string(),
            Sentiment::Neutral => format!(
                "Interesting! You said: '{}' — I'm still learning about this topic. \
                 Ask me about Python, ML, Data Science, or Flask! 💬",
                message
            ),
        }
    };
    ChatReply::tagged(reply, ReplyKind::Fallback, analysis.sentiment)
}
