//! Response types returned by the answer pipeline.
//!
//! [`ChatResponse`] is the shape consumed by presentation layers (the `syl`
//! CLI prints it as JSON). Sources are redacted to [`SourceSummary`] so raw
//! metadata never leaves the pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EntityType;
use crate::record::Record;
use crate::suggestion::Suggestion;

/// Display-safe summary of a record that informed an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceSummary {
    pub id: String,
    pub entity_type: EntityType,
    pub score: f64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_code: Option<String>,
}

impl From<&Record> for SourceSummary {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id.clone(),
            entity_type: record.entity_type,
            score: record.score,
            title: record.display_title().to_string(),
            course_code: record.course_code().map(str::to_string),
            module_code: record.module_code().map(str::to_string),
        }
    }
}

/// Final result of answering one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatResponse {
    pub answer_text: String,
    pub sources: Vec<SourceSummary>,
    pub suggestions: Vec<Suggestion>,
    /// Whether the response was served from the response cache.
    pub cached: bool,
    pub latency_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fields;

    #[test]
    fn source_summary_keeps_only_display_fields() {
        let record = Record::new("asm-1", EntityType::Assessment, 0.91)
            .with_field(fields::MODULE_TITLE, "Databases")
            .with_field(fields::MODULE_CODE, "DB200")
            .with_field("internalNotes", "do not show");

        let summary = SourceSummary::from(&record);
        assert_eq!(summary.title, "Databases");
        assert_eq!(summary.module_code.as_deref(), Some("DB200"));
        assert_eq!(summary.course_code, None);

        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("internalNotes"));
        assert!(!json.contains("course_code"));
    }
}
