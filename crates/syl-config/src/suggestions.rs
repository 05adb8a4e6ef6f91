//! Suggestion ranking.

use serde::{Deserialize, Serialize};
use syl_core::suggestion::MAX_SUGGESTIONS;

const fn default_max_suggestions() -> usize {
    MAX_SUGGESTIONS
}

const fn default_context_bonus() -> f64 {
    0.05
}

const fn default_intent_bonus() -> f64 {
    0.10
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SuggestionConfig {
    /// Requested suggestion count; never more than three are returned.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Added once per known hint (track, year, module) the record agrees with.
    #[serde(default = "default_context_bonus")]
    pub context_bonus: f64,

    /// Added when the record's entity type is what the query asks about.
    #[serde(default = "default_intent_bonus")]
    pub intent_bonus: f64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            context_bonus: default_context_bonus(),
            intent_bonus: default_intent_bonus(),
        }
    }
}

impl SuggestionConfig {
    /// Configured count clamped to the hard ceiling.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.max_suggestions.min(MAX_SUGGESTIONS)
    }
}
