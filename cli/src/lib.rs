//! # Chatbot Library
//!
//! File: cli/src/lib.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A small keyword-matching chatbot: canned answers from FAQ and topic
//! dictionaries, typo tolerance, sentiment tagging, a short per-user memory
//! and, optionally, a language model for anything the dictionaries miss.
//!
//! The library is shared by the `chatbot` binary and the integration tests:
//! - `bot`: the engine (`ChatEngine`) and its building blocks
//! - `commands`: the `serve` (HTTP API) and `chat` (terminal) front ends
//! - `core`: configuration and error types
//!
pub mod bot;
pub mod commands;
pub mod core;
