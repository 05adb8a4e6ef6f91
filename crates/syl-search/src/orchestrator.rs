//! Retrieval orchestration: primary search, relaxed retry, calendar pass,
//! hierarchy expansion, secondary assessment pass and deterministic merge.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{join, join_all};
use syl_config::RetrievalConfig;
use syl_core::conversation::ConversationContext;
use syl_core::enums::EntityType;
use syl_core::errors::UpstreamError;
use syl_core::record::{MetadataFilter, Record, fields};
use syl_core::traits::{Embedder, SearchParams, VectorSearch};

use crate::error::PipelineError;
use crate::intent::QueryIntent;

/// Result of retrieval for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// Merged, deduplicated and hierarchy-ordered records.
    Records(Vec<Record>),
    /// Nothing relevant, even after the relaxed retry.
    NoMatch,
}

impl RetrievalOutcome {
    #[must_use]
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Records(records) => records,
            Self::NoMatch => &[],
        }
    }

    #[must_use]
    pub const fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}

/// Metadata filter from explicitly known context fields.
///
/// Module and assessment hints are vocabulary nouns rather than stored
/// values, so only track and year take part.
#[must_use]
pub fn build_filter(ctx: &ConversationContext) -> MetadataFilter {
    let mut filter = MetadataFilter::new();
    if let Some(track) = ctx.track {
        filter = filter.with_field(fields::TRACK, track.as_str());
    }
    if let Some(year) = &ctx.year {
        filter = filter.with_field(fields::YEAR, year.as_str());
    }
    filter
}

/// Prefix the query with known track/year when it does not already say so.
#[must_use]
pub fn rewrite_query(query: &str, ctx: &ConversationContext) -> String {
    let lower = query.to_lowercase();
    let words = crate::intent::tokenize(query);

    let track = ctx
        .track
        .filter(|t| !words.iter().any(|w| t.matches_label(w)));
    let year = ctx.year.as_deref().filter(|y| {
        let compact = format!("year{y}");
        let spaced = format!("year {y}");
        !lower.contains(&compact) && !lower.contains(&spaced)
    });

    let prefix = match (track, year) {
        (Some(t), Some(y)) => format!("{t} Year {y}"),
        (Some(t), None) => t.to_string(),
        (None, Some(y)) => format!("Year {y}"),
        (None, None) => return query.to_string(),
    };
    format!("{prefix}: {query}")
}

/// Uppercase and strip brackets and whitespace: `"com 4001 (a)"` -> `"COM4001A"`.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '[' | ']' | '{' | '}'))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Concatenate groups, keep the first record per id, then stably regroup by
/// hierarchy order.
#[must_use]
pub fn merge_records(groups: Vec<Vec<Record>>) -> Vec<Record> {
    let mut seen = HashSet::new();
    let mut merged: Vec<Record> = groups
        .into_iter()
        .flatten()
        .filter(|record| seen.insert(record.id.clone()))
        .collect();
    merged.sort_by_key(|record| record.entity_type.hierarchy_rank());
    merged
}

/// Distinct non-empty values in first-seen order, capped at `limit`.
fn distinct_codes<'a>(
    records: impl Iterator<Item = &'a Record>,
    code: impl Fn(&Record) -> Option<&str>,
    limit: usize,
) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .filter_map(|record| code(record).map(str::to_string))
        .filter(|c| seen.insert(normalize_code(c)))
        .take(limit)
        .collect()
}

/// Issues the searches for one query and merges their results.
pub struct RetrievalOrchestrator {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorSearch>,
    config: RetrievalConfig,
}

impl RetrievalOrchestrator {
    #[must_use]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorSearch>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    /// Run retrieval for `query`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Upstream`] when the query embedding or the
    /// primary search fails. All other search failures are logged and skipped.
    pub async fn retrieve(
        &self,
        query: &str,
        ctx: &ConversationContext,
        namespace: &str,
    ) -> Result<RetrievalOutcome, PipelineError> {
        let intent = QueryIntent::classify(query);
        let filter = build_filter(ctx);
        let rewritten = rewrite_query(query, ctx);
        if rewritten != query {
            tracing::debug!(%rewritten, "query rewritten with known context");
        }

        let vector = self.embedder.embed(&rewritten).await?;

        let top_k = if intent.assessment {
            self.config.assessment_top_k
        } else {
            self.config.default_top_k
        };
        let primary_params = SearchParams {
            top_k,
            namespace: namespace.to_string(),
            filter,
            min_score: self.config.min_score,
        };
        let mut primary = self.search(&vector, &primary_params).await?;

        if primary.is_empty() {
            tracing::debug!("primary search empty, retrying without filter");
            let relaxed = SearchParams {
                filter: MetadataFilter::new(),
                min_score: self.config.relaxed_min_score,
                ..primary_params
            };
            primary = match self.search(&vector, &relaxed).await {
                Ok(records) => records,
                Err(error) => {
                    tracing::warn!(%error, "relaxed retry failed");
                    Vec::new()
                }
            };
            if primary.is_empty() {
                tracing::debug!("no records after relaxed retry");
                return Ok(RetrievalOutcome::NoMatch);
            }
        }

        let calendar = if intent.scheduling {
            let params = self.scoped(namespace, EntityType::Calendar, self.config.calendar_top_k);
            self.best_effort("calendar", self.search(&vector, &params)).await
        } else {
            Vec::new()
        };

        let hierarchy = self
            .expand_hierarchy(&vector, namespace, &intent, primary.iter().chain(&calendar))
            .await;

        let secondary = if intent.assessment {
            let params = self.scoped(namespace, EntityType::Assessment, self.config.assessment_top_k);
            self.best_effort("secondary assessment", self.search(&vector, &params))
                .await
        } else {
            Vec::new()
        };

        // Calendar records lead, so they win any id collision with primary.
        let mut groups = vec![calendar, primary];
        groups.extend(hierarchy);
        groups.push(secondary);
        Ok(RetrievalOutcome::Records(merge_records(groups)))
    }

    /// Fan out one future per module / course code; results come back in
    /// input order regardless of completion order.
    async fn expand_hierarchy<'a>(
        &self,
        vector: &[f32],
        namespace: &str,
        intent: &QueryIntent,
        seeds: impl Iterator<Item = &'a Record> + Clone,
    ) -> Vec<Vec<Record>> {
        let limit = self.config.max_expansions;
        let module_codes = distinct_codes(seeds.clone(), Record::module_code, limit);
        let course_codes = if intent.module_listing {
            distinct_codes(seeds, Record::course_code, limit)
        } else {
            Vec::new()
        };

        let assessment_fetches = module_codes.iter().map(|code| async move {
            let result = self.assessments_for_module(vector, namespace, code).await;
            (code, result)
        });
        let module_fetches = course_codes.iter().map(|code| async move {
            let result = self.modules_for_course(vector, namespace, code).await;
            (code, result)
        });

        let (assessments, modules) = join(join_all(assessment_fetches), join_all(module_fetches)).await;

        assessments
            .into_iter()
            .chain(modules)
            .filter_map(|(code, result)| match result {
                Ok(records) => Some(records),
                Err(error) => {
                    tracing::warn!(%error, code = %code, "hierarchy expansion failed, skipping");
                    None
                }
            })
            .collect()
    }

    /// Exact code, then normalized code, then a broad search filtered here.
    async fn assessments_for_module(
        &self,
        vector: &[f32],
        namespace: &str,
        code: &str,
    ) -> Result<Vec<Record>, UpstreamError> {
        let mut params = self.scoped(namespace, EntityType::Assessment, self.config.expansion_top_k);

        params.filter = params.filter.with_field(fields::MODULE_CODE, code);
        let exact = self.search(vector, &params).await?;
        if !exact.is_empty() {
            return Ok(exact);
        }

        let normalized = normalize_code(code);
        if normalized != code {
            params.filter = params.filter.with_field(fields::MODULE_CODE, normalized.as_str());
            let found = self.search(vector, &params).await?;
            if !found.is_empty() {
                return Ok(found);
            }
        }

        tracing::debug!(code, "falling back to broad assessment search");
        let broad = SearchParams {
            top_k: self.config.broad_top_k,
            namespace: namespace.to_string(),
            filter: MetadataFilter::new(),
            min_score: self.config.relaxed_min_score,
        };
        let records = self.search(vector, &broad).await?;
        Ok(records
            .into_iter()
            .filter(|r| {
                r.entity_type == EntityType::Assessment
                    && r.module_code().is_some_and(|m| normalize_code(m) == normalized)
            })
            .collect())
    }

    async fn modules_for_course(
        &self,
        vector: &[f32],
        namespace: &str,
        code: &str,
    ) -> Result<Vec<Record>, UpstreamError> {
        let mut params = self.scoped(namespace, EntityType::Module, self.config.expansion_top_k);
        params.filter = params.filter.with_field(fields::COURSE_CODE, code);
        self.search(vector, &params).await
    }

    fn scoped(&self, namespace: &str, entity_type: EntityType, top_k: usize) -> SearchParams {
        SearchParams {
            top_k,
            namespace: namespace.to_string(),
            filter: MetadataFilter::new().with_entity_type(entity_type),
            min_score: self.config.relaxed_min_score,
        }
    }

    /// Search and drop anything under the floor, whatever the backend returned.
    async fn search(
        &self,
        vector: &[f32],
        params: &SearchParams,
    ) -> Result<Vec<Record>, UpstreamError> {
        let mut records = self.index.search(vector, params).await?;
        records.retain(|r| r.score >= params.min_score);
        Ok(records)
    }

    async fn best_effort(
        &self,
        pass: &str,
        search: impl Future<Output = Result<Vec<Record>, UpstreamError>>,
    ) -> Vec<Record> {
        search.await.unwrap_or_else(|error| {
            tracing::warn!(%error, pass, "search pass failed, skipping");
            Vec::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use syl_core::enums::Track;

    #[test]
    fn filter_contains_only_known_fields() {
        let ctx = ConversationContext {
            year: Some("1".into()),
            module: Some("databases".into()),
            ..Default::default()
        };
        let filter = build_filter(&ctx);
        assert_eq!(filter.entity_type, None);
        assert_eq!(filter.fields.len(), 1);
        assert_eq!(filter.fields.get(fields::YEAR).map(String::as_str), Some("1"));

        assert!(build_filter(&ConversationContext::default()).is_empty());
    }

    #[test]
    fn rewrite_adds_missing_qualifiers() {
        let ctx = ConversationContext {
            track: Some(Track::Fd),
            year: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(
            rewrite_query("When is the essay due?", &ctx),
            "FD Year 1: When is the essay due?"
        );
        assert_eq!(
            rewrite_query("FD year 1 essay deadline", &ctx),
            "FD year 1 essay deadline"
        );
        assert_eq!(rewrite_query("year 1 essay", &ctx), "FD: year 1 essay");
        assert_eq!(
            rewrite_query("anything", &ConversationContext::default()),
            "anything"
        );
    }

    #[test]
    fn normalize_code_strips_brackets_and_spaces() {
        assert_eq!(normalize_code(" com 4001 (a) "), "COM4001A");
        assert_eq!(normalize_code("[DB200]"), "DB200");
    }

    #[test]
    fn merge_keeps_first_seen_and_groups_by_hierarchy() {
        let first = Record::new("dup", EntityType::Module, 0.9).with_field("marker", "first");
        let second = Record::new("dup", EntityType::Module, 0.4).with_field("marker", "second");
        let merged = merge_records(vec![
            vec![
                Record::new("asm", EntityType::Assessment, 0.7),
                first,
                Record::new("cal", EntityType::Calendar, 0.6),
            ],
            vec![second, Record::new("crs", EntityType::Course, 0.5)],
        ]);

        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["crs", "dup", "asm", "cal"]);
        assert_eq!(merged[1].field("marker"), Some("first"));
    }
}
