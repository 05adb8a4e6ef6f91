use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Answer a question from the knowledge base.
    Ask(QueryArgs),
    /// Show retrieval, ambiguity and suggestions for a question without generating.
    Inspect(QueryArgs),
    /// Interactive conversation sharing history and the response cache.
    Chat,
    /// Print the JSON schema of the answer payload.
    Schema,
}

#[derive(Clone, Debug, Args)]
pub struct QueryArgs {
    /// The question to answer.
    pub query: String,

    /// JSONL file of prior turns (`{"role":"user","content":"..."}` per line).
    #[arg(long)]
    pub history: Option<PathBuf>,
}
