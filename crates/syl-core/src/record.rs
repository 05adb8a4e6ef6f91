//! Retrievable records and exact-match metadata filters.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{EntityType, Track};

/// Well-known metadata keys carried in [`Record::fields`].
pub mod fields {
    pub const COURSE_CODE: &str = "courseCode";
    pub const MODULE_CODE: &str = "moduleCode";
    pub const TITLE: &str = "title";
    pub const COURSE_TITLE: &str = "courseTitle";
    pub const MODULE_TITLE: &str = "moduleTitle";
    pub const TRACK: &str = "track";
    pub const YEAR: &str = "year";
    pub const SEMESTER: &str = "semester";
    pub const LEVEL: &str = "level";
    pub const ASSESSMENT_TYPE: &str = "assessmentType";
    pub const DEADLINE: &str = "deadline";
    pub const WEIGHT: &str = "weight";

    /// Keys rendered first, in this order, when a record is shown as context.
    pub const HIERARCHY_ORDER: [&str; 5] = [COURSE_CODE, MODULE_CODE, YEAR, SEMESTER, DEADLINE];
}

/// One retrievable unit returned by the vector-search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Record {
    /// Unique identifier within a namespace.
    pub id: String,
    /// Relevance to the query embedding, in `[0, 1]`.
    pub score: f64,
    pub entity_type: EntityType,
    /// Open metadata: hierarchy keys plus display fields.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Record {
    #[must_use]
    pub fn new(id: impl Into<String>, entity_type: EntityType, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
            entity_type,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// A metadata value, ignoring blank entries.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn course_code(&self) -> Option<&str> {
        self.field(fields::COURSE_CODE)
    }

    #[must_use]
    pub fn module_code(&self) -> Option<&str> {
        self.field(fields::MODULE_CODE)
    }

    /// Year of study, normalized to its digits (`"Year 2"` → `"2"`).
    #[must_use]
    pub fn year(&self) -> Option<String> {
        self.field(fields::YEAR).map(normalize_year)
    }

    /// The track stored on the record, if it names a known one.
    #[must_use]
    pub fn track(&self) -> Option<Track> {
        let label = self.field(fields::TRACK)?;
        [Track::Fd, Track::Bsc]
            .into_iter()
            .find(|t| t.matches_label(label))
    }

    /// Best available display title: `title`, then `moduleTitle`,
    /// then `courseTitle`, then the record id.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.field(fields::TITLE)
            .or_else(|| self.field(fields::MODULE_TITLE))
            .or_else(|| self.field(fields::COURSE_TITLE))
            .unwrap_or(&self.id)
    }
}

/// Reduce a year value to its first run of digits.
///
/// Values without digits are lowercased and trimmed instead, so
/// comparisons stay stable for labels like `"foundation"`.
#[must_use]
pub fn normalize_year(value: &str) -> String {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        value.trim().to_lowercase()
    } else {
        digits
    }
}

/// Exact-match metadata filter sent with a vector search.
///
/// Only keys that are explicitly set take part in matching; an empty filter
/// matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    pub entity_type: Option<EntityType>,
    pub fields: BTreeMap<String, String>,
}

impl MetadataFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entity_type(mut self, entity_type: EntityType) -> Self {
        self.entity_type = Some(entity_type);
        self
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_type.is_none() && self.fields.is_empty()
    }

    /// Whether `record` satisfies every constraint in the filter.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        if self
            .entity_type
            .is_some_and(|expected| expected != record.entity_type)
        {
            return false;
        }
        self.fields
            .iter()
            .all(|(key, expected)| record.field(key) == Some(expected.trim()))
    }
}
