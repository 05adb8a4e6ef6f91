//! Detects clusters of near-equally relevant records.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;
use syl_config::AmbiguityConfig;
use syl_core::enums::EntityType;
use syl_core::record::Record;

use crate::intent::QueryIntent;

/// Absorbs float noise in `top - score` so a spread equal to the tolerance
/// is kept.
const TOLERANCE_EPSILON: f64 = 1e-9;

/// How a cluster's membership was decided.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClusterPolicy {
    /// Same entity type, within `tolerance` of the best score.
    Tolerance { tolerance: f64 },
    /// Mixed types, every member at or above `floor`.
    CrossType { floor: f64 },
}

/// Records that are hard to tell apart for the current query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordCluster {
    /// `None` for the mixed-type fallback cluster.
    pub entity_type: Option<EntityType>,
    /// Sorted by descending score.
    pub members: Vec<Record>,
    pub average_score: f64,
    pub policy: ClusterPolicy,
}

impl RecordCluster {
    fn new(entity_type: Option<EntityType>, members: Vec<Record>, policy: ClusterPolicy) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let average_score =
            members.iter().map(|r| r.score).sum::<f64>() / members.len().max(1) as f64;
        Self {
            entity_type,
            members,
            average_score,
            policy,
        }
    }

    /// `module`, `assessment`, ... or `mixed`.
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.entity_type.map_or("mixed", EntityType::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AmbiguityReport {
    pub has_ambiguity: bool,
    /// Sorted by descending average score.
    pub clusters: Vec<RecordCluster>,
}

fn by_score_desc(a: &Record, b: &Record) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
}

/// Groups records by type and flags clusters of near-equal relevance.
#[derive(Debug, Clone, Default)]
pub struct AmbiguityAnalyzer {
    config: AmbiguityConfig,
}

impl AmbiguityAnalyzer {
    #[must_use]
    pub const fn new(config: AmbiguityConfig) -> Self {
        Self { config }
    }

    /// Pure and total: never fails for any input.
    #[must_use]
    pub fn analyze(&self, records: &[Record], query: &str) -> AmbiguityReport {
        let mut clusters: Vec<RecordCluster> = EntityType::ALL
            .into_iter()
            .filter_map(|entity_type| self.type_cluster(records, entity_type))
            .collect();

        if clusters.is_empty() && QueryIntent::classify(query).broad {
            clusters.extend(self.cross_type_cluster(records));
        }

        clusters.sort_by(|a, b| {
            b.average_score
                .partial_cmp(&a.average_score)
                .unwrap_or(Ordering::Equal)
        });

        AmbiguityReport {
            has_ambiguity: !clusters.is_empty(),
            clusters,
        }
    }

    fn type_cluster(&self, records: &[Record], entity_type: EntityType) -> Option<RecordCluster> {
        let mut partition: Vec<Record> = records
            .iter()
            .filter(|r| r.entity_type == entity_type)
            .cloned()
            .collect();
        if partition.len() < 2 {
            return None;
        }
        partition.sort_by(by_score_desc);

        let tolerance = self.config.tolerance_for(entity_type);
        let top = partition[0].score;
        partition.retain(|r| top - r.score <= tolerance + TOLERANCE_EPSILON);
        if partition.len() < 2 {
            return None;
        }

        Some(RecordCluster::new(
            Some(entity_type),
            partition,
            ClusterPolicy::Tolerance { tolerance },
        ))
    }

    fn cross_type_cluster(&self, records: &[Record]) -> Option<RecordCluster> {
        let floor = self.config.cross_type_floor;
        let mut top: Vec<Record> = records.iter().filter(|r| r.score >= floor).cloned().collect();
        top.sort_by(by_score_desc);
        top.truncate(self.config.cross_type_max_members);

        let types: BTreeSet<u8> = top.iter().map(|r| r.entity_type.hierarchy_rank()).collect();
        if types.len() < 2 {
            return None;
        }
        Some(RecordCluster::new(None, top, ClusterPolicy::CrossType { floor }))
    }
}
