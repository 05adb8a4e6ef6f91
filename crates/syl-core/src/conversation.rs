//! Conversation turns and the per-request hint snapshot derived from them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Role, Track};

/// One message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Side effect recorded while extracting hints, kept for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextNote {
    /// No explicit year was found, so the track's fixed year was applied.
    YearDefaulted { track: Track, year: String },
}

/// Hints extracted from the current query and recent turns.
///
/// Created once per request and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConversationContext {
    pub track: Option<Track>,
    pub year: Option<String>,
    pub module: Option<String>,
    pub assessment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<ContextNote>,
}

/// Which hints are known for this request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[allow(clippy::struct_excessive_bools)]
pub struct SpecificFlags {
    pub track: bool,
    pub year: bool,
    pub module: bool,
    pub assessment: bool,
}

impl SpecificFlags {
    #[must_use]
    pub const fn any(self) -> bool {
        self.track || self.year || self.module || self.assessment
    }
}

impl ConversationContext {
    #[must_use]
    pub const fn specific_flags(&self) -> SpecificFlags {
        SpecificFlags {
            track: self.track.is_some(),
            year: self.year.is_some(),
            module: self.module.is_some(),
            assessment: self.assessment.is_some(),
        }
    }

    /// Whether at least one hint narrows the conversation.
    #[must_use]
    pub const fn has_specific(&self) -> bool {
        self.specific_flags().any()
    }

    /// Whether the year was filled in by the single-year track rule.
    #[must_use]
    pub fn year_was_defaulted(&self) -> bool {
        self.notes
            .iter()
            .any(|note| matches!(note, ContextNote::YearDefaulted { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_no_specific_flags() {
        let ctx = ConversationContext::default();
        assert!(!ctx.has_specific());
        assert_eq!(ctx.specific_flags(), SpecificFlags::default());
    }

    #[test]
    fn any_single_hint_is_specific() {
        let ctx = ConversationContext {
            assessment: Some("exam".into()),
            ..Default::default()
        };
        assert!(ctx.has_specific());
        assert!(ctx.specific_flags().assessment);
        assert!(!ctx.specific_flags().year);
    }

    #[test]
    fn defaulted_year_is_reported() {
        let ctx = ConversationContext {
            track: Some(Track::Bsc),
            year: Some("3".into()),
            notes: vec![ContextNote::YearDefaulted {
                track: Track::Bsc,
                year: "3".into(),
            }],
            ..Default::default()
        };
        assert!(ctx.year_was_defaulted());
    }

    #[test]
    fn note_serializes_with_kind_tag() {
        let note = ContextNote::YearDefaulted {
            track: Track::Bsc,
            year: "3".into(),
        };
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["kind"], "year_defaulted");
        assert_eq!(json["track"], "BSc");
    }
}
