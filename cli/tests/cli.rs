//! # Chatbot Binary Integration Tests
//!
//! File: cli/tests/cli.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Runs the compiled `chatbot` binary. The terminal chat reads stdin to the
//! end, so each test feeds a scripted conversation.
//!

mod common;
use common::*;

use predicates::prelude::*;

const CONFIG: &str = r#"
[bot]
name = "Testy"

[[knowledge.topics]]
keyword = "rust"
reply = "Rust is a systems language focused on safety and speed."
"#;

#[test]
fn chat_answers_and_quits() {
    let config = config_file(CONFIG);
    chatbot_cmd()
        .env_remove("CHATBOT_CONFIG")
        .args(["chat", "--user-id", "amy", "--config"])
        .arg(config.path())
        .write_stdin("hello\ntell me about rust\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chat with Testy!"))
        .stdout(predicate::str::contains("Testy: Hello! 👋 How can I assist you today?"))
        .stdout(predicate::str::contains(
            "Testy: Rust is a systems language focused on safety and speed.",
        ));
}

#[test]
fn chat_ends_on_farewell() {
    let config = config_file(CONFIG);
    chatbot_cmd()
        .env_remove("CHATBOT_CONFIG")
        .arg("chat")
        .arg("--config")
        .arg(config.path())
        .write_stdin("bye\nhello\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Goodbye!"))
        .stdout(predicate::str::contains("How can I assist you").not());
}

#[test]
fn chat_mode_flag_overrides_file() {
    let config = config_file(CONFIG);
    chatbot_cmd()
        .env_remove("CHATBOT_CONFIG")
        .args(["chat", "--mode", "basic", "--config"])
        .arg(config.path())
        .write_stdin("Zebra\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "I didn’t fully get that 😅 but you said: zebra",
        ));
}

#[test]
fn chat_clear_command() {
    let config = config_file(CONFIG);
    chatbot_cmd()
        .env_remove("CHATBOT_CONFIG")
        .arg("chat")
        .arg("--config")
        .arg(config.path())
        .write_stdin("zebra\n/clear\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Testy: History cleared! 🧹"));
}

#[test]
fn generative_mode_needs_endpoint() {
    let config = config_file(CONFIG);
    chatbot_cmd()
        .env_remove("CHATBOT_CONFIG")
        .args(["chat", "--mode", "generative", "--config"])
        .arg(config.path())
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("endpoint"));
}

#[test]
fn unknown_config_keys_are_rejected() {
    let config = config_file("[bot]\nnmae = \"typo\"\n");
    chatbot_cmd()
        .env_remove("CHATBOT_CONFIG")
        .arg("chat")
        .arg("--config")
        .arg(config.path())
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn missing_explicit_config_fails() {
    chatbot_cmd()
        .env_remove("CHATBOT_CONFIG")
        .args(["chat", "--config", "/definitely/not/here/chatbot.toml"])
        .write_stdin("quit\n")
        .assert()
        .failure();
}

#[test]
fn serve_help_lists_flags() {
    chatbot_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--static-dir"))
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--no-cors"));
}
