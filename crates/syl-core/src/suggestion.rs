//! User-facing disambiguation options.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EntityType;

/// Upper bound on suggestions returned for one request.
pub const MAX_SUGGESTIONS: usize = 3;

/// Upper bound on detail items shown on one suggestion.
pub const MAX_DETAIL_ITEMS: usize = 3;

/// One icon + label line shown under a suggestion title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetailItem {
    /// Icon name understood by the presentation layer (e.g. `calendar`).
    pub icon: String,
    pub label: String,
}

impl DetailItem {
    #[must_use]
    pub fn new(icon: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
        }
    }
}

/// A clickable option offered when the query matches several records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Suggestion {
    /// Id of the record the suggestion was built from.
    pub id: String,
    pub title: String,
    /// At most [`MAX_DETAIL_ITEMS`] entries.
    pub detail_items: Vec<DetailItem>,
    /// Query to resubmit when the option is chosen.
    pub followup_query: String,
    /// Relevance of the source record.
    pub source_score: f64,
    pub entity_type: EntityType,
}
