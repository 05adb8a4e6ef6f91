//! Retrieval orchestration tuning.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_top_k() -> usize {
    10
}

/// Assessment-shaped queries fetch more records: a module typically has a
/// handful of assessments and all of them should be considered.
const fn default_assessment_top_k() -> usize {
    20
}

const fn default_calendar_top_k() -> usize {
    5
}

const fn default_expansion_top_k() -> usize {
    25
}

const fn default_broad_top_k() -> usize {
    50
}

const fn default_min_score() -> f64 {
    0.5
}

const fn default_relaxed_min_score() -> f64 {
    0.35
}

const fn default_max_expansions() -> usize {
    8
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Primary search size for general queries.
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,

    /// Primary search size for assessment / deadline queries.
    #[serde(default = "default_assessment_top_k")]
    pub assessment_top_k: usize,

    /// Size of the calendar-scoped scheduling search.
    #[serde(default = "default_calendar_top_k")]
    pub calendar_top_k: usize,

    /// Size of each filtered hierarchy-expansion search.
    #[serde(default = "default_expansion_top_k")]
    pub expansion_top_k: usize,

    /// Size of the unfiltered last-resort expansion search.
    #[serde(default = "default_broad_top_k")]
    pub broad_top_k: usize,

    /// Score floor for the primary search.
    #[serde(default = "default_min_score")]
    pub min_score: f64,

    /// Score floor for the relaxed retry and secondary passes.
    #[serde(default = "default_relaxed_min_score")]
    pub relaxed_min_score: f64,

    /// Maximum number of module / course codes expanded per request.
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_top_k: default_top_k(),
            assessment_top_k: default_assessment_top_k(),
            calendar_top_k: default_calendar_top_k(),
            expansion_top_k: default_expansion_top_k(),
            broad_top_k: default_broad_top_k(),
            min_score: default_min_score(),
            relaxed_min_score: default_relaxed_min_score(),
            max_expansions: default_max_expansions(),
        }
    }
}

impl RetrievalConfig {
    /// Check score floors are in range and the relaxed floor really relaxes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::check_unit_interval("retrieval.min_score", self.min_score)?;
        crate::check_unit_interval("retrieval.relaxed_min_score", self.relaxed_min_score)?;
        if self.relaxed_min_score > self.min_score {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.relaxed_min_score".into(),
                reason: format!(
                    "must not exceed retrieval.min_score ({})",
                    self.min_score
                ),
            });
        }
        if self.default_top_k == 0 || self.assessment_top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retrieval.default_top_k".into(),
                reason: "primary search sizes must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_top_k, 10);
        assert_eq!(config.assessment_top_k, 20);
    }

    #[test]
    fn relaxed_floor_above_primary_is_rejected() {
        let config = RetrievalConfig {
            relaxed_min_score: 0.8,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("relaxed_min_score"));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let config = RetrievalConfig {
            default_top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
