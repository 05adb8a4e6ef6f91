//! General application configuration.

use serde::{Deserialize, Serialize};

fn default_namespace() -> String {
    String::from("default")
}

/// Number of most recent turns scanned for hints.
const fn default_history_turns() -> usize {
    6
}

/// Number of sources echoed back in a response.
const fn default_display_sources() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Knowledge-base namespace queried when none is given.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// How many recent conversation turns the context extractor reads.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,

    /// How many redacted sources a response carries.
    #[serde(default = "default_display_sources")]
    pub display_sources: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            history_turns: default_history_turns(),
            display_sources: default_display_sources(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.namespace, "default");
        assert_eq!(config.history_turns, 6);
        assert_eq!(config.display_sources, 5);
    }
}
