use std::io::Write as _;

use anyhow::Context;
use syl_core::conversation::Turn;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// One line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Empty,
    Quit,
    Reset,
    ClearCache,
    Unknown(&'a str),
    Query(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    match line {
        "" => ChatInput::Empty,
        "/quit" | "/exit" => ChatInput::Quit,
        "/reset" => ChatInput::Reset,
        "/clear-cache" => ChatInput::ClearCache,
        command if command.starts_with('/') => ChatInput::Unknown(command),
        query => ChatInput::Query(query),
    }
}

/// Keep at most `limit` turns, dropping the oldest.
fn trim_history(history: &mut Vec<Turn>, limit: usize) {
    let excess = history.len().saturating_sub(limit);
    history.drain(..excess);
}

fn prompt(quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        let mut stderr = std::io::stderr();
        write!(stderr, "> ")?;
        stderr.flush()?;
    }
    Ok(())
}

/// Handle `syl chat`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    // Two turns per exchange.
    let retained = ctx.config.general.history_turns.saturating_mul(2).max(2);
    let mut history: Vec<Turn> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if !flags.quiet {
        eprintln!("syl chat ({}) - /reset, /clear-cache, /quit", ctx.namespace);
    }

    loop {
        prompt(flags.quiet)?;
        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };

        match parse_input(&line) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Reset => {
                history.clear();
                eprintln!("history cleared");
            }
            ChatInput::ClearCache => {
                ctx.pipeline.clear_cache();
                eprintln!("response cache cleared");
            }
            ChatInput::Unknown(command) => {
                eprintln!("unknown command {command}; try /reset, /clear-cache or /quit");
            }
            ChatInput::Query(query) => {
                match ctx.pipeline.answer(query, &history, &ctx.namespace).await {
                    Ok(response) => {
                        output(&response, flags.format)?;
                        history.push(Turn::user(query));
                        history.push(Turn::assistant(response.answer_text));
                        trim_history(&mut history, retained);
                    }
                    Err(error) => {
                        tracing::warn!(%error, "chat turn failed");
                        eprintln!("syl error: {error}");
                    }
                }
            }
        }
    }

    Ok(())
}
