//! # Chatbot Commands
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! One module per top-level command:
//! - `serve`: JSON API over HTTP
//! - `chat`: interactive chat in the terminal
//!
//! Each exposes an argument struct (parsed by clap in `main.rs`) and an
//! async `handle_*` entry point returning `core::error::Result`.
//!
pub mod chat;
pub mod serve;
