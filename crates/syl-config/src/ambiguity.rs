//! Ambiguity detection thresholds.

use serde::{Deserialize, Serialize};
use syl_core::enums::EntityType;

use crate::error::ConfigError;

const fn default_assessment_tolerance() -> f64 {
    0.20
}

const fn default_module_tolerance() -> f64 {
    0.15
}

const fn default_course_tolerance() -> f64 {
    0.15
}

const fn default_other_tolerance() -> f64 {
    0.10
}

const fn default_cross_type_floor() -> f64 {
    0.70
}

const fn default_cross_type_max_members() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AmbiguityConfig {
    #[serde(default = "default_assessment_tolerance")]
    pub assessment_tolerance: f64,

    #[serde(default = "default_module_tolerance")]
    pub module_tolerance: f64,

    #[serde(default = "default_course_tolerance")]
    pub course_tolerance: f64,

    /// Tolerance for calendar and unknown records.
    #[serde(default = "default_other_tolerance")]
    pub other_tolerance: f64,

    /// Minimum score for records considered by the mixed-type fallback.
    #[serde(default = "default_cross_type_floor")]
    pub cross_type_floor: f64,

    /// Maximum members of the mixed-type fallback cluster.
    #[serde(default = "default_cross_type_max_members")]
    pub cross_type_max_members: usize,
}

impl Default for AmbiguityConfig {
    fn default() -> Self {
        Self {
            assessment_tolerance: default_assessment_tolerance(),
            module_tolerance: default_module_tolerance(),
            course_tolerance: default_course_tolerance(),
            other_tolerance: default_other_tolerance(),
            cross_type_floor: default_cross_type_floor(),
            cross_type_max_members: default_cross_type_max_members(),
        }
    }
}

impl AmbiguityConfig {
    /// Score spread tolerated inside a cluster of `entity_type` records.
    #[must_use]
    pub const fn tolerance_for(&self, entity_type: EntityType) -> f64 {
        match entity_type {
            EntityType::Assessment => self.assessment_tolerance,
            EntityType::Module => self.module_tolerance,
            EntityType::Course => self.course_tolerance,
            EntityType::Calendar | EntityType::Unknown => self.other_tolerance,
        }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for values outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        crate::check_unit_interval("ambiguity.assessment_tolerance", self.assessment_tolerance)?;
        crate::check_unit_interval("ambiguity.module_tolerance", self.module_tolerance)?;
        crate::check_unit_interval("ambiguity.course_tolerance", self.course_tolerance)?;
        crate::check_unit_interval("ambiguity.other_tolerance", self.other_tolerance)?;
        crate::check_unit_interval("ambiguity.cross_type_floor", self.cross_type_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_tolerance_is_widest() {
        let config = AmbiguityConfig::default();
        assert!(
            config.tolerance_for(EntityType::Assessment)
                > config.tolerance_for(EntityType::Module)
        );
        assert!((config.tolerance_for(EntityType::Calendar) - 0.10).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let config = AmbiguityConfig {
            module_tolerance: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
