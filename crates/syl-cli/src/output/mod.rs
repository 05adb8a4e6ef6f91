use std::fmt::Write as _;

use serde::Serialize;
use syl_core::conversation::ConversationContext;
use syl_core::enums::Track;
use syl_core::responses::ChatResponse;
use syl_core::suggestion::Suggestion;
use syl_search::Inspection;

use crate::cli::OutputFormat;

/// Human-readable rendering used by `--format text`.
pub trait TextView {
    fn to_text(&self) -> String;
}

/// Render a response to a string in the requested format.
pub fn render<T: Serialize + TextView>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
        OutputFormat::Text => Ok(value.to_text()),
    }
}

/// Print a response in the requested format.
pub fn output<T: Serialize + TextView>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn percent(score: f64) -> String {
    format!("{:.0}%", (score * 100.0).round())
}

fn write_suggestions(out: &mut String, suggestions: &[Suggestion]) {
    if suggestions.is_empty() {
        return;
    }
    out.push_str("\nDid you mean:\n");
    for (position, suggestion) in suggestions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", position + 1, suggestion.title);
        if !suggestion.detail_items.is_empty() {
            let details = suggestion
                .detail_items
                .iter()
                .map(|item| item.label.as_str())
                .collect::<Vec<_>>()
                .join(" | ");
            let _ = writeln!(out, "     {details}");
        }
        let _ = writeln!(out, "     ask: {}", suggestion.followup_query);
    }
}

fn describe_context(ctx: &ConversationContext) -> String {
    let hint = |value: Option<&str>| value.unwrap_or("-").to_string();
    let mut line = format!(
        "track={} year={} module={} assessment={}",
        hint(ctx.track.map(Track::as_str)),
        hint(ctx.year.as_deref()),
        hint(ctx.module.as_deref()),
        hint(ctx.assessment.as_deref()),
    );
    if ctx.year_was_defaulted() {
        line.push_str(" (year defaulted)");
    }
    line
}

impl TextView for ChatResponse {
    fn to_text(&self) -> String {
        let mut out = self.answer_text.trim_end().to_string();
        out.push('\n');

        if !self.sources.is_empty() {
            out.push_str("\nSources:\n");
            for source in &self.sources {
                let _ = writeln!(
                    out,
                    "  - {} ({}, {})",
                    source.title,
                    source.entity_type.label(),
                    percent(source.score)
                );
            }
        }

        write_suggestions(&mut out, &self.suggestions);

        let _ = write!(
            out,
            "\n[{} ms{}]",
            self.latency_ms,
            if self.cached { ", cached" } else { "" }
        );
        out
    }
}

impl TextView for Inspection {
    fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Context: {}", describe_context(&self.context));
        let _ = writeln!(out, "Rewritten query: {}", self.rewritten_query);

        if self.no_match {
            out.push_str("Records: none above the relevance floor\n");
        } else {
            let _ = writeln!(out, "Records: {}", self.records.len());
            for record in &self.records {
                let _ = writeln!(
                    out,
                    "  - [{}] {} ({})",
                    record.entity_type.label(),
                    record.display_title(),
                    percent(record.score)
                );
            }
        }

        if self.ambiguity.has_ambiguity {
            out.push_str("Ambiguous clusters:\n");
            for cluster in &self.ambiguity.clusters {
                let _ = writeln!(
                    out,
                    "  - {}: {} records, average {}",
                    cluster.label(),
                    cluster.members.len(),
                    percent(cluster.average_score)
                );
            }
        }

        write_suggestions(&mut out, &self.suggestions);

        out.push_str("\n--- assembled context ---\n");
        out.push_str(&self.assembled.text);
        out
    }
}

impl TextView for serde_json::Value {
    fn to_text(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_string())
    }
}
