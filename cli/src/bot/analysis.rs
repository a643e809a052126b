//! # Message Analysis
//!
//! File: cli/src/bot/analysis.rs
//! Author: Christi Mahu
//!
//! Word-list classifiers run over every message in enhanced and generative
//! mode. All checks are substring checks on the lowercased text, so "hi"
//! also fires inside "this"; the reply pipeline is tuned around that.
//!
use serde::Serialize;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "awesome", "love", "excellent", "happy", "nice", "wonderful", "amazing",
    "best", "perfect",
];
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "hate", "terrible", "awful", "worst", "horrible", "annoying", "sad", "angry",
    "frustrated",
];
const QUESTION_WORDS: &[&str] = &[
    "what", "why", "how", "when", "where", "who", "which", "can", "could", "would", "is", "are",
    "do", "does",
];
const GREETINGS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];
const FAREWELLS: &[&str] = &["bye", "goodbye", "see you", "later", "bye bye"];
const GRATITUDE: &[&str] = &["thank", "thanks", "thx", "appreciate"];

/// Coarse mood of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Everything the pipeline wants to know about a message, computed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Analysis {
    pub sentiment: Sentiment,
    pub is_question: bool,
    pub is_greeting: bool,
    pub is_farewell: bool,
    pub is_gratitude: bool,
}

impl Analysis {
    pub fn of(text: &str) -> Self {
        Self {
            sentiment: sentiment(text),
            is_question: is_question(text),
            is_greeting: is_greeting(text),
            is_farewell: is_farewell(text),
            is_gratitude: is_gratitude(text),
        }
    }
}

/// Counts how many list words occur in the text; each word counts once.
fn hits(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| text.contains(*w)).count()
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|w| lower.contains(w))
}

/// Positive and negative hit counts decide; a tie is neutral.
pub fn sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = hits(&lower, POSITIVE_WORDS);
    let negative = hits(&lower, NEGATIVE_WORDS);
    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// A question mark anywhere, or a leading question word.
pub fn is_question(text: &str) -> bool {
    if text.contains('?') {
        return true;
    }
    let lower = text.to_lowercase();
    lower
        .split_whitespace()
        .next()
        .is_some_and(|first| QUESTION_WORDS.contains(&first))
}

pub fn is_greeting(text: &str) -> bool {
    contains_any(text, GREETINGS)
}

pub fn is_farewell(text: &str) -> bool {
    contains_any(text, FAREWELLS)
}

pub fn is_gratitude(text: &str) -> bool {
    contains_any(text, GRATITUDE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_counts_words() {
        assert_eq!(sentiment("This is GREAT and awesome"), Sentiment::Positive);
        assert_eq!(sentiment("what a terrible, awful day"), Sentiment::Negative);
        assert_eq!(sentiment("the weather today"), Sentiment::Neutral);
        // One of each is a tie.
        assert_eq!(sentiment("good but sad"), Sentiment::Neutral);
    }

    #[test]
    fn sentiment_counts_each_word_once() {
        // "bad" three times is still one negative hit, outweighed by two positives.
        assert_eq!(sentiment("bad bad bad, but nice and happy"), Sentiment::Positive);
    }

    #[test]
    fn question_detection() {
        assert!(is_question("Where do zebras live?"));
        assert!(is_question("tell me more?"));
        assert!(is_question("Does it rain"));
        assert!(!is_question("tell me a story"));
        assert!(!is_question(""));
        assert!(!is_question("   "));
    }

    #[test]
    fn intent_detection_uses_substrings() {
        assert!(is_greeting("Hey there"));
        assert!(is_greeting("GOOD MORNING"));
        // Substring semantics: "this" contains "hi".
        assert!(is_greeting("what is this"));
        assert!(!is_greeting("tell me about python"));

        assert!(is_farewell("see you tomorrow"));
        assert!(is_farewell("talk later"));
        assert!(!is_farewell("python"));

        assert!(is_gratitude("Thx a lot"));
        assert!(is_gratitude("I appreciate it"));
        assert!(!is_gratitude("hello"));
    }

    #[test]
    fn analysis_bundles_everything() {
        let analysis = Analysis::of("Why is it so bad?");
        assert_eq!(analysis.sentiment, Sentiment::Negative);
        assert!(analysis.is_question);
        assert!(!analysis.is_greeting);
        assert!(!analysis.is_farewell);
        assert!(!analysis.is_gratitude);
    }
}
