//! Response cache bounds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Five minutes.
const fn default_ttl_ms() -> u64 {
    300_000
}

const fn default_max_entries() -> usize {
    256
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Entries older than this are treated as absent.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Capacity; the oldest inserted entry is evicted beyond it.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            max_entries: default_max_entries(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }
}
