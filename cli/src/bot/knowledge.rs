//! # Knowledge Base
//!
//! File: cli/src/bot/knowledge.rs
//! Author: Christi Mahu
//!
//! Two ordered keyword → reply dictionaries: the FAQ (small talk) and the
//! topic list (study subjects). Lookups are substring checks over entries in
//! insertion order; the first hit wins.
//!
use crate::core::config::EntryConfig;

const FAQ: &[(&str, &str)] = &[
    ("hello", "Hello! 👋 How can I assist you today?"),
    ("hi", "Hi 👋! What's up?"),
    ("who are you", "I'm your local AI chatbot — no API needed 😎"),
    // "your name" is built from the configured bot name.
    ("bye", "Goodbye! 👋 Keep learning & keep building!"),
    (
        "help",
        "Sure! I can chat, answer basic questions, and help with study topics.",
    ),
    ("how are you", "I'm doing great! Thanks for asking 😊"),
    ("thank you", "You're welcome! Happy to help! 😊"),
    ("thanks", "No problem! Anytime! 👍"),
];

const TOPICS: &[(&str, &str)] = &[
    (
        "python",
        "Python is widely used in data science, AI, automation & web development.",
    ),
    (
        "machine learning",
        "Machine Learning lets computers learn patterns from data without explicit programming.",
    ),
    (
        "data science",
        "Data Science involves collecting, cleaning, analyzing & visualizing data to make decisions.",
    ),
    (
        "flask",
        "Flask is a lightweight Python web framework — perfect for small APIs & projects.",
    ),
    (
        "html",
        "HTML stands for HyperText Markup Language — used for website structure.",
    ),
    (
        "javascript",
        "JavaScript adds interactivity to websites and runs in the browser.",
    ),
    (
        "database",
        "Databases store and organize data. Popular ones include MySQL, PostgreSQL, and MongoDB.",
    ),
    (
        "api",
        "API (Application Programming Interface) lets different software communicate with each other.",
    ),
    (
        "algorithm",
        "An algorithm is a step-by-step procedure to solve a problem or perform a task.",
    ),
];

/// A keyword and the canned reply it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub keyword: String,
    pub reply: String,
}

impl Entry {
    pub fn new(keyword: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            reply: reply.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    faq: Vec<Entry>,
    topics: Vec<Entry>,
}

impl KnowledgeBase {
    /// The built-in dictionaries, with `bot_name` woven into the "your name" reply.
    pub fn builtin(bot_name: &str) -> Self {
        let mut faq: Vec<Entry> = FAQ.iter().map(|(k, r)| Entry::new(*k, *r)).collect();
        faq.insert(
            3,
            Entry::new(
                "your name",
                format!("I'm {} 🤖 running completely offline!", bot_name),
            ),
        );
        let topics = TOPICS.iter().map(|(k, r)| Entry::new(*k, *r)).collect();
        Self { faq, topics }
    }

    /// Layers config-supplied entries on top. A known keyword keeps its
    /// position and takes the new reply; new keywords are appended.
    pub fn with_extra(mut self, faq: &[EntryConfig], topics: &[EntryConfig]) -> Self {
        for extra in faq {
            upsert(&mut self.faq, extra);
        }
        for extra in topics {
            upsert(&mut self.topics, extra);
        }
        self
    }

    /// First FAQ entry whose keyword occurs in `text`.
    pub fn find_faq(&self, text: &str) -> Option<&Entry> {
        self.faq.iter().find(|e| text.contains(e.keyword.as_str()))
    }

    /// First topic entry whose keyword occurs in `text`.
    pub fn find_topic(&self, text: &str) -> Option<&Entry> {
        self.topics.iter().find(|e| text.contains(e.keyword.as_str()))
    }

    /// FAQ entries followed by topic entries.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.faq.iter().chain(self.topics.iter())
    }

    pub fn total_topics(&self) -> usize {
        self.faq.len() + self.topics.len()
    }
}

fn upsert(entries: &mut Vec<Entry>, extra: &EntryConfig) {
    let keyword = extra.keyword.trim().to_lowercase();
    match entries.iter_mut().find(|e| e.keyword == keyword) {
        Some(existing) => existing.reply = extra.reply.clone(),
        None => entries.push(Entry::new(keyword, extra.reply.clone())),
    }
}
