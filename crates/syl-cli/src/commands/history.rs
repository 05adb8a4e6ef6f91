use std::path::Path;

use anyhow::Context;
use syl_core::conversation::Turn;

/// Read prior turns from a JSONL file; no path means no history.
pub fn load_history(path: Option<&Path>) -> anyhow::Result<Vec<Turn>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };

    let turns = serde_jsonlines::json_lines::<Turn, _>(path)
        .with_context(|| format!("failed to open history file {}", path.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("invalid turn in history file {}", path.display()))?;

    tracing::debug!(turns = turns.len(), path = %path.display(), "history loaded");
    Ok(turns)
}
