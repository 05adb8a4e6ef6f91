//! Serde roundtrip and JsonSchema validation tests for response types.

use pretty_assertions::assert_eq;
use schemars::schema_for;
use syl_core::conversation::{ContextNote, ConversationContext, Turn};
use syl_core::enums::{EntityType, Track};
use syl_core::record::{Record, fields};
use syl_core::responses::{ChatResponse, SourceSummary};
use syl_core::suggestion::{DetailItem, Suggestion};

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(recovered, val, "serde roundtrip failed for {}", stringify!($ty));

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn sample_record() -> Record {
    Record::new("mod-ars", EntityType::Module, 0.873)
        .with_field(fields::TITLE, "Academic Research and Study Skills")
        .with_field(fields::MODULE_CODE, "ARS101")
        .with_field(fields::COURSE_CODE, "FDCOMP")
        .with_field(fields::YEAR, "1")
}

roundtrip_and_validate!(record_roundtrip, Record, sample_record());

roundtrip_and_validate!(
    context_roundtrip,
    ConversationContext,
    ConversationContext {
        track: Some(Track::Bsc),
        year: Some("3".into()),
        module: None,
        assessment: Some("exam".into()),
        notes: vec![ContextNote::YearDefaulted {
            track: Track::Bsc,
            year: "3".into(),
        }],
    }
);

roundtrip_and_validate!(turn_roundtrip, Turn, Turn::assistant("Which year are you in?"));

roundtrip_and_validate!(
    chat_response_roundtrip,
    ChatResponse,
    ChatResponse {
        answer_text: "The essay is due in week 10.".into(),
        sources: vec![SourceSummary::from(&sample_record())],
        suggestions: vec![Suggestion {
            id: "mod-ars".into(),
            title: "Academic Research and Study Skills".into(),
            detail_items: vec![DetailItem::new("book", "Year 1, Semester 1")],
            followup_query: "What are the assessments for Academic Research and Study Skills?"
                .into(),
            source_score: 0.873,
            entity_type: EntityType::Module,
        }],
        cached: false,
        latency_ms: 412,
    }
);

#[test]
fn unknown_entity_type_in_stored_json_is_tolerated() {
    let json = r#"{"id":"x","score":0.4,"entity_type":"workshop","fields":{}}"#;
    let record: Record = serde_json::from_str(json).unwrap();
    assert_eq!(record.entity_type, EntityType::Unknown);
}
