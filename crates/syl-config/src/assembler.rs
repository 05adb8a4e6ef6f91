//! Bounds on the context block handed to the generator.

use serde::{Deserialize, Serialize};

const fn default_max_records() -> usize {
    40
}

const fn default_max_chars() -> usize {
    12_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssemblerConfig {
    /// Maximum record entries rendered.
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Character budget for the whole context block.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            max_chars: default_max_chars(),
        }
    }
}
