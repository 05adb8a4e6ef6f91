//! Knowledge-base location.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct KnowledgeConfig {
    /// Path to the JSONL knowledge-base file.
    #[serde(default)]
    pub path: String,
}

impl KnowledgeConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.path.is_empty()
    }
}
