//! Renders the bounded context block handed to the generator.
//!
//! Output order is fixed: hierarchy summary, ambiguity notice, then one
//! entry per record. Rendering is pure, so identical inputs always produce
//! identical text.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::{Value, json};
use syl_config::AssemblerConfig;
use syl_core::enums::EntityType;
use syl_core::record::{Record, fields};

use crate::ambiguity::{AmbiguityReport, RecordCluster};

/// Text used when retrieval found nothing relevant.
pub const NO_MATCH_NOTICE: &str = "No information was found in the knowledge base for this question. \
Tell the user plainly that you could not find it, do not guess or invent details, \
and ask them to rephrase or mention their course, year or module.";

const ACTION_REQUIRED: &str = "ACTION REQUIRED: several records match this question almost equally. \
Present them to the user as options and ask which one they mean before answering in detail.";

const SUMMARY_HEADER: &str = "## Knowledge hierarchy\n";
const NOTICE_HEADER: &str = "\n## Ambiguity notice\n```json\n";
const RECORDS_HEADER: &str = "\n## Records\n";

/// Room kept for the omitted-records trailer.
const TRAILER_RESERVE: usize = "(99999 more records omitted)\n".len();
/// Room kept for a `(+N more)` marker after a capped list.
const MORE_MARKER_RESERVE: usize = " (+9999 more)".len();

/// Distinct hierarchy identifiers observed, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchySummary {
    pub course_codes: Vec<String>,
    pub module_codes: Vec<String>,
    pub assessments: Vec<String>,
}

impl HierarchySummary {
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let mut summary = Self::default();
        let mut seen = HashSet::new();
        let mut push = |list: &mut Vec<String>, kind: u8, value: &str| {
            if seen.insert((kind, value.to_string())) {
                list.push(value.to_string());
            }
        };

        for record in records {
            if let Some(code) = record.course_code() {
                push(&mut summary.course_codes, 0, code);
            }
            if let Some(code) = record.module_code() {
                push(&mut summary.module_codes, 1, code);
            }
            if record.entity_type == EntityType::Assessment {
                push(&mut summary.assessments, 2, &assessment_descriptor(record));
            }
        }
        summary
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.course_codes.is_empty() && self.module_codes.is_empty() && self.assessments.is_empty()
    }
}

/// `"DB200 coursework"`, falling back to the display title.
fn assessment_descriptor(record: &Record) -> String {
    match (record.module_code(), record.field(fields::ASSESSMENT_TYPE)) {
        (Some(code), Some(kind)) => format!("{code} {kind}"),
        _ => record.display_title().to_string(),
    }
}

/// Context text plus the structured summary it was built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssembledContext {
    pub text: String,
    pub summary: HierarchySummary,
}

fn percent(score: f64) -> String {
    format!("{:.0}%", (score * 100.0).round())
}

/// Fields that differ between members, so the user can tell them apart.
fn distinguishing_fields(cluster: &RecordCluster, record: &Record) -> BTreeMap<String, String> {
    record
        .fields
        .iter()
        .filter(|(key, value)| {
            cluster
                .members
                .iter()
                .any(|other| other.fields.get(key.as_str()) != Some(*value))
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Notice JSON showing the first `shown[i]` members of cluster `i`.
fn ambiguity_notice(report: &AmbiguityReport, shown: &[usize]) -> Value {
    let clusters: Vec<Value> = report
        .clusters
        .iter()
        .zip(shown)
        .filter(|(_, count)| **count > 0)
        .map(|(cluster, count)| {
            let members: Vec<Value> = cluster
                .members
                .iter()
                .take(*count)
                .map(|record| {
                    json!({
                        "id": record.id,
                        "title": record.display_title(),
                        "type": record.entity_type.as_str(),
                        "score": percent(record.score),
                        "fields": distinguishing_fields(cluster, record),
                    })
                })
                .collect();
            json!({
                "type": cluster.label(),
                "averageScore": percent(cluster.average_score),
                "members": members,
            })
        })
        .collect();
    json!({ "ambiguous": true, "clusters": clusters })
}

fn notice_block(report: &AmbiguityReport, shown: &[usize]) -> String {
    let total: usize = report.clusters.iter().map(|c| c.members.len()).sum();
    let omitted = total.saturating_sub(shown.iter().sum());

    let mut block = String::from(NOTICE_HEADER);
    block.push_str(&serde_json::to_string_pretty(&ambiguity_notice(report, shown)).unwrap_or_default());
    block.push_str("\n```\n");
    if omitted > 0 {
        let _ = writeln!(block, "({omitted} more options omitted)");
    }
    block.push_str(ACTION_REQUIRED);
    block.push('\n');
    block
}

/// Largest notice that fits `budget`, filling clusters in report order.
fn render_notice(report: &AmbiguityReport, budget: usize) -> Option<String> {
    let mut shown: Vec<usize> = Vec::with_capacity(report.clusters.len());
    let mut block = notice_block(report, &shown);

    'fill: for (index, cluster) in report.clusters.iter().enumerate() {
        shown.push(0);
        for count in 1..=cluster.members.len() {
            shown[index] = count;
            let candidate = notice_block(report, &shown);
            if candidate.len() > budget {
                shown[index] = count - 1;
                break 'fill;
            }
            block = candidate;
        }
    }

    (block.len() <= budget).then_some(block)
}

fn render_summary(summary: &HierarchySummary, budget: usize) -> String {
    let lines = [
        ("Courses", &summary.course_codes),
        ("Modules", &summary.module_codes),
        ("Assessments", &summary.assessments),
    ];
    let width = budget.saturating_sub(SUMMARY_HEADER.len()) / lines.len();

    let mut text = String::from(SUMMARY_HEADER);
    for (label, values) in lines {
        // label, ": " and the newline
        let room = width.saturating_sub(label.len() + 3);
        let _ = writeln!(text, "{label}: {}", capped_list(values, room));
    }
    text
}

/// Comma-joined values up to `width`, then a `(+N more)` marker.
fn capped_list(values: &[String], width: usize) -> String {
    if values.is_empty() {
        return "none".to_string();
    }

    let mut joined = String::new();
    let mut shown = 0;
    for (i, value) in values.iter().enumerate() {
        let separator = if joined.is_empty() { 0 } else { 2 };
        let marker = if i + 1 < values.len() { MORE_MARKER_RESERVE } else { 0 };
        if joined.len() + separator + value.len() + marker > width {
            break;
        }
        if separator > 0 {
            joined.push_str(", ");
        }
        joined.push_str(value);
        shown += 1;
    }

    let hidden = values.len() - shown;
    if hidden > 0 {
        if !joined.is_empty() {
            joined.push(' ');
        }
        let _ = write!(joined, "(+{hidden} more)");
    }
    joined
}

/// Hierarchy fields first in fixed order, then the rest alphabetically.
fn ordered_fields(record: &Record) -> Vec<(&str, &str)> {
    let mut ordered: Vec<(&str, &str)> = fields::HIERARCHY_ORDER
        .iter()
        .filter_map(|key| record.field(key).map(|value| (*key, value)))
        .collect();
    ordered.extend(
        record
            .fields
            .iter()
            .filter(|(key, _)| !fields::HIERARCHY_ORDER.contains(&key.as_str()))
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(key, value)| (key.as_str(), value.trim())),
    );
    ordered
}

fn render_record(position: usize, record: &Record) -> String {
    let mut entry = format!(
        "[{position}] {}: {} (relevance {})\n",
        record.entity_type.label(),
        record.display_title(),
        percent(record.score)
    );
    for (key, value) in ordered_fields(record) {
        let _ = writeln!(entry, "  {key}: {value}");
    }
    entry
}

/// Builds [`AssembledContext`] within the configured bounds.
#[derive(Debug, Clone, Default)]
pub struct ContextAssembler {
    config: AssemblerConfig,
}

impl ContextAssembler {
    #[must_use]
    pub const fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    /// Every section is charged against `max_chars`. Summary lists are capped
    /// to a third of it and the ambiguity notice to half; records fill what
    /// is left.
    #[must_use]
    pub fn assemble(&self, records: &[Record], report: &AmbiguityReport) -> AssembledContext {
        let summary = HierarchySummary::from_records(records);
        let budget = self.config.max_chars.saturating_sub(TRAILER_RESERVE);
        let mut text = String::new();

        let summary_text = render_summary(&summary, budget / 3);
        if summary_text.len() <= budget {
            text.push_str(&summary_text);
        }

        if report.has_ambiguity {
            let room = (budget / 2).min(budget.saturating_sub(text.len()));
            match render_notice(report, room) {
                Some(block) => text.push_str(&block),
                None => tracing::debug!(room, "ambiguity notice does not fit, dropped"),
            }
        }

        if text.len() + RECORDS_HEADER.len() <= budget {
            text.push_str(RECORDS_HEADER);
        }
        let mut rendered = 0;
        for (i, record) in records.iter().take(self.config.max_records).enumerate() {
            let entry = render_record(i + 1, record);
            if text.len() + entry.len() > budget {
                break;
            }
            text.push_str(&entry);
            rendered += 1;
        }

        let omitted = records.len() - rendered;
        if omitted > 0 {
            let _ = writeln!(text, "({omitted} more records omitted)");
        }

        AssembledContext { text, summary }
    }

    /// Context for a query with no relevant records.
    #[must_use]
    pub fn no_match(&self) -> AssembledContext {
        AssembledContext {
            text: format!("## Knowledge base\n{NO_MATCH_NOTICE}\n"),
            summary: HierarchySummary::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambiguity::AmbiguityAnalyzer;
    use pretty_assertions::assert_eq;

    fn records() -> Vec<Record> {
        vec![
            Record::new("crs", EntityType::Course, 0.61)
                .with_field(fields::COURSE_CODE, "FDCOMP")
                .with_field(fields::COURSE_TITLE, "FD Computing"),
            Record::new("m1", EntityType::Module, 0.873)
                .with_field(fields::TITLE, "Academic Research and Study Skills")
                .with_field(fields::COURSE_CODE, "FDCOMP")
                .with_field(fields::MODULE_CODE, "ARS101")
                .with_field(fields::YEAR, "1")
                .with_field("leader", "Dr Patel"),
            Record::new("m2", EntityType::Module, 0.851)
                .with_field(fields::TITLE, "Advanced Academic Research")
                .with_field(fields::COURSE_CODE, "FDCOMP")
                .with_field(fields::MODULE_CODE, "AAR201")
                .with_field(fields::YEAR, "2"),
            Record::new("a1", EntityType::Assessment, 0.7)
                .with_field(fields::MODULE_CODE, "ARS101")
                .with_field(fields::MODULE_TITLE, "Academic Research and Study Skills")
                .with_field(fields::ASSESSMENT_TYPE, "essay")
                .with_field(fields::DEADLINE, "Week 10"),
        ]
    }

    #[test]
    fn assembling_twice_is_byte_identical() {
        let records = records();
        let report = AmbiguityAnalyzer::default().analyze(&records, "academic research");
        let assembler = ContextAssembler::default();
        assert_eq!(
            assembler.assemble(&records, &report).text,
            assembler.assemble(&records, &report).text
        );
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let records = records();
        let report = AmbiguityAnalyzer::default().analyze(&records, "academic research");
        assert!(report.has_ambiguity);
        let text = ContextAssembler::default().assemble(&records, &report).text;

        let hierarchy = text.find("## Knowledge hierarchy").unwrap();
        let notice = text.find("## Ambiguity notice").unwrap();
        let action = text.find("ACTION REQUIRED").unwrap();
        let entries = text.find("## Records").unwrap();
        assert!(hierarchy < notice && notice < action && action < entries);
    }

    #[test]
    fn summary_lists_distinct_codes_in_order() {
        let summary = HierarchySummary::from_records(&records());
        assert_eq!(summary.course_codes, vec!["FDCOMP"]);
        assert_eq!(summary.module_codes, vec!["ARS101", "AAR201"]);
        assert_eq!(summary.assessments, vec!["ARS101 essay"]);
    }

    #[test]
    fn entries_show_percent_and_hierarchy_fields_first() {
        let records = records();
        let text = ContextAssembler::default()
            .assemble(&records[1..2], &AmbiguityReport::default())
            .text;
        assert!(text.contains("[1] Module: Academic Research and Study Skills (relevance 87%)"));

        let course = text.find("  courseCode: FDCOMP").unwrap();
        let module = text.find("  moduleCode: ARS101").unwrap();
        let year = text.find("  year: 1").unwrap();
        let leader = text.find("  leader: Dr Patel").unwrap();
        assert!(course < module && module < year && year < leader);
        assert!(!text.contains("Ambiguity notice"));
    }

    #[test]
    fn notice_lists_distinguishing_fields_only() {
        let records = records();
        let report = AmbiguityAnalyzer::default().analyze(&records, "academic research");
        let notice = ambiguity_notice(&report, &[usize::MAX]);
        let members = notice["clusters"][0]["members"].as_array().unwrap();
        let fields = members[0]["fields"].as_object().unwrap();

        assert!(fields.contains_key("year"));
        assert!(!fields.contains_key("courseCode"), "shared value is not distinguishing");
        assert_eq!(members[0]["score"], "87%");
    }

    #[test]
    fn record_bound_is_enforced_with_trailer() {
        let assembler = ContextAssembler::new(AssemblerConfig {
            max_records: 2,
            max_chars: 12_000,
        });
        let text = assembler.assemble(&records(), &AmbiguityReport::default()).text;
        assert!(text.contains("[2]"));
        assert!(!text.contains("[3]"));
        assert!(text.contains("(2 more records omitted)"));
    }

    #[test]
    fn char_budget_is_enforced() {
        let assembler = ContextAssembler::new(AssemblerConfig {
            max_records: 40,
            max_chars: 250,
        });
        let assembled = assembler.assemble(&records(), &AmbiguityReport::default());
        assert!(assembled.text.contains("more records omitted"));
        assert!(!assembled.text.contains("[4]"));
    }

    #[test]
    fn oversized_cluster_stays_within_char_budget() {
        let records: Vec<Record> = (0..60u32)
            .map(|i| {
                Record::new(format!("asm-{i}"), EntityType::Assessment, 0.9 - f64::from(i) * 0.001)
                    .with_field(fields::MODULE_CODE, format!("MOD{i:03}"))
                    .with_field(fields::ASSESSMENT_TYPE, "coursework")
                    .with_field(fields::DEADLINE, format!("Week {}", i % 12 + 1))
            })
            .collect();
        let report = AmbiguityAnalyzer::default().analyze(&records, "coursework");
        assert!(report.has_ambiguity);
        assert_eq!(report.clusters[0].members.len(), 60);

        let assembler = ContextAssembler::new(AssemblerConfig {
            max_records: 40,
            max_chars: 2_000,
        });
        let text = assembler.assemble(&records, &report).text;

        assert!(text.len() <= 2_000, "context is {} chars", text.len());
        assert!(text.contains("## Ambiguity notice"));
        assert!(text.contains("more options omitted)"));
        assert!(text.contains("ACTION REQUIRED"));
        assert!(text.contains("Assessments: MOD000 coursework"));
        assert!(text.contains(" more)\n"));
        assert!(text.contains("more records omitted)"));
    }

    #[test]
    fn capped_list_marks_hidden_values() {
        let values: Vec<String> = ["ARS101", "AAR201", "DB200"].map(String::from).to_vec();
        assert_eq!(capped_list(&values, 100), "ARS101, AAR201, DB200");
        assert_eq!(capped_list(&values, 20), "ARS101 (+2 more)");
        assert_eq!(capped_list(&[], 0), "none");
    }

    #[test]
    fn no_match_context_says_nothing_was_found() {
        let assembled = ContextAssembler::default().no_match();
        assert!(assembled.text.contains("No information was found"));
        assert!(assembled.summary.is_empty());
    }
}
