//! # Chatbot Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Foundational pieces shared by every command:
//! - `config`: Configuration loading and validation
//! - `error`: Error types and the crate-wide `Result` alias
//!
pub mod config;
pub mod error;
