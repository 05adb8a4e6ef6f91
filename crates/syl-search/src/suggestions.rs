//! Turns ambiguous clusters into a short list of selectable options.

use std::cmp::Ordering;
use std::collections::HashSet;

use syl_config::SuggestionConfig;
use syl_core::conversation::ConversationContext;
use syl_core::enums::EntityType;
use syl_core::record::{Record, fields};
use syl_core::suggestion::{DetailItem, MAX_DETAIL_ITEMS, Suggestion};

use crate::ambiguity::AmbiguityReport;
use crate::intent::QueryIntent;

/// Builds ranked [`Suggestion`]s from an [`AmbiguityReport`].
#[derive(Debug, Clone, Default)]
pub struct SuggestionBuilder {
    config: SuggestionConfig,
}

impl SuggestionBuilder {
    #[must_use]
    pub const fn new(config: SuggestionConfig) -> Self {
        Self { config }
    }

    /// At most three suggestions, none unless the context has a specific hint.
    #[must_use]
    pub fn build(
        &self,
        report: &AmbiguityReport,
        ctx: &ConversationContext,
        query: &str,
    ) -> Vec<Suggestion> {
        if !ctx.has_specific() || !report.has_ambiguity {
            return Vec::new();
        }
        let requested = QueryIntent::classify(query).requested_type();

        let mut seen = HashSet::new();
        let mut ranked: Vec<(f64, Suggestion)> = Vec::new();
        for record in report.clusters.iter().flat_map(|c| &c.members) {
            if contradicts(record, ctx) {
                tracing::debug!(id = %record.id, "suggestion excluded by known context");
                continue;
            }
            let title = title_for(record);
            if !seen.insert((record.entity_type, title.to_lowercase())) {
                continue;
            }
            let priority = self.priority(record, ctx, requested);
            ranked.push((priority, build_suggestion(record, title)));
        }

        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        ranked
            .into_iter()
            .take(self.config.effective_limit())
            .map(|(_, suggestion)| suggestion)
            .collect()
    }

    fn priority(
        &self,
        record: &Record,
        ctx: &ConversationContext,
        requested: Option<EntityType>,
    ) -> f64 {
        let track_match = ctx.track.is_some() && ctx.track == record.track();
        let year_match = ctx.year.is_some() && ctx.year == record.year();
        let module_match = ctx.module.as_deref().is_some_and(|hint| {
            let hint = hint.to_lowercase();
            [fields::TITLE, fields::MODULE_TITLE]
                .iter()
                .filter_map(|key| record.field(key))
                .any(|value| value.to_lowercase().contains(&hint))
        });

        let agreeing = [track_match, year_match, module_match]
            .iter()
            .filter(|m| **m)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let context_bonus = self.config.context_bonus * agreeing as f64;
        let intent_bonus = if requested == Some(record.entity_type) {
            self.config.intent_bonus
        } else {
            0.0
        };
        record.score + context_bonus + intent_bonus
    }
}

/// A known track or year that the record states differently.
fn contradicts(record: &Record, ctx: &ConversationContext) -> bool {
    let year_conflict = matches!((&ctx.year, record.year()), (Some(known), Some(stored)) if *known != stored);
    let track_conflict =
        matches!((ctx.track, record.track()), (Some(known), Some(stored)) if known != stored);
    year_conflict || track_conflict
}

fn title_for(record: &Record) -> String {
    match record.entity_type {
        EntityType::Module => record
            .field(fields::TITLE)
            .or_else(|| record.field(fields::MODULE_TITLE))
            .unwrap_or(record.id.as_str())
            .to_string(),
        EntityType::Assessment => {
            let module = record
                .field(fields::MODULE_TITLE)
                .unwrap_or_else(|| record.display_title());
            match record.field(fields::ASSESSMENT_TYPE) {
                Some(kind) => format!("{module} ({kind})"),
                None => module.to_string(),
            }
        }
        EntityType::Course => record
            .field(fields::COURSE_TITLE)
            .unwrap_or_else(|| record.display_title())
            .to_string(),
        EntityType::Calendar | EntityType::Unknown => record.display_title().to_string(),
    }
}

fn prefixed(prefix: &str, value: &str) -> String {
    if value.to_lowercase().starts_with(&prefix.to_lowercase()) {
        value.to_string()
    } else {
        format!("{prefix} {value}")
    }
}

fn details_for(record: &Record) -> Vec<DetailItem> {
    let mut items = Vec::new();
    match record.entity_type {
        EntityType::Assessment => {
            if let Some(deadline) = record.field(fields::DEADLINE) {
                items.push(DetailItem::new("calendar", format!("Due {deadline}")));
            }
            if let Some(weight) = record.field(fields::WEIGHT) {
                items.push(DetailItem::new("scale", format!("{weight} of module mark")));
            }
        }
        EntityType::Module => {
            let year = record.field(fields::YEAR).map(|y| prefixed("Year", y));
            let semester = record.field(fields::SEMESTER).map(|s| prefixed("Semester", s));
            match (year, semester) {
                (Some(y), Some(s)) => items.push(DetailItem::new("book", format!("{y}, {s}"))),
                (Some(y), None) => items.push(DetailItem::new("book", y)),
                _ => {}
            }
        }
        EntityType::Course => {
            if let Some(level) = record.field(fields::LEVEL) {
                items.push(DetailItem::new("graduation-cap", prefixed("Level", level)));
            }
        }
        EntityType::Calendar | EntityType::Unknown => {}
    }
    items.truncate(MAX_DETAIL_ITEMS);
    items
}

fn followup_for(record: &Record, title: &str) -> String {
    match record.entity_type {
        EntityType::Module => format!("What are the assessments for {title}?"),
        EntityType::Assessment => format!("Tell me about the {title} assessment"),
        EntityType::Course => format!("What modules are in {title}?"),
        EntityType::Calendar | EntityType::Unknown => format!("Tell me more about {title}"),
    }
}

fn build_suggestion(record: &Record, title: String) -> Suggestion {
    Suggestion {
        id: record.id.clone(),
        detail_items: details_for(record),
        followup_query: followup_for(record, &title),
        source_score: record.score,
        entity_type: record.entity_type,
        title,
    }
}
