//! # Terminal Chat
//!
//! File: cli/src/commands/chat.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `chatbot chat` talks to the engine from the terminal, without starting
//! the HTTP server. Each line typed is one message.
//!
//! | Input            | Effect                                   |
//! |------------------|------------------------------------------|
//! | `quit` / `exit`  | leave the session                        |
//! | `/clear`         | empty the message window                 |
//! | `/reset`         | forget the whole conversation            |
//! | anything else    | sent to the engine                       |
//!
//! A farewell reply ends the session after it is printed.
//!
use crate::bot::{ChatEngine, Mode, ReplyKind};
use crate::core::config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// # Chat Command Arguments (`ChatArgs`)
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Response pipeline; overrides `bot.mode` from the config file.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// User id the conversation is kept under.
    #[arg(long, short)]
    pub user_id: Option<String>,

    /// Configuration file to use instead of the discovered one.
    #[arg(long, short, env = "CHATBOT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Entry point for `chatbot chat`.
pub async fn handle_chat(args: ChatArgs) -> Result<()> {
    debug!("Handling chat command with args: {:?}", args);

    let mut app = config::load_config(args.config.as_deref())?;
    if let Some(mode) = args.mode {
        app.bot.mode = mode;
    }
    config::validate_config(&app).context("Configuration validation failed")?;

    let engine = ChatEngine::from_config(&app)?;
    let user_id = engine.user_or_default(args.user_id.as_deref()).to_string();
    info!("Starting terminal chat as '{}' in {} mode", user_id, engine.mode());

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run_session(&engine, &user_id, stdin, stdout).await
}

/// Reads messages line by line from `input` and writes replies to `output`
/// until `quit`, a farewell, or end of input.
pub async fn run_session<R, W>(
    engine: &ChatEngine,
    user_id: &str,
    input: R,
    mut output: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let name = engine.name();
    output
        .write_all(
            format!(
                "Chat with {}! Type 'quit' to leave, '/clear' or '/reset' to start over.\n",
                name
            )
            .as_bytes(),
        )
        .await?;

    let mut lines = input.lines();
    loop {
        output.write_all(b"You: ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            output.write_all(b"\n").await?;
            break;
        };

        let reply = match line.trim() {
            "quit" | "exit" => break,
            "/clear" => {
                engine.history().clear(user_id).await;
                format!("{}: History cleared! 🧹\n", name)
            }
            "/reset" => {
                engine.history().reset(user_id).await;
                format!("{}: Conversation reset! Starting fresh 🔄\n", name)
            }
            message => {
                let reply = engine.respond(user_id, message).await;
                output
                    .write_all(format!("{}: {}\n", name, reply.reply).as_bytes())
                    .await?;
                if reply.kind == Some(ReplyKind::Farewell) {
                    break;
                }
                continue;
            }
        };
        output.write_all(reply.as_bytes()).await?;
    }

    output.flush().await?;
    Ok(())
}
