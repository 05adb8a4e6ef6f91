//! Entity types, course tracks, conversation roles, and upstream service names.
//!
//! All enums serialize as `snake_case` except [`Track`], whose labels
//! (`FD`, `BSc`) are the values stored in knowledge-base metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Kind of record stored in the knowledge base.
///
/// The first three variants form the knowledge hierarchy:
///
/// ```text
/// course → module → assessment
/// ```
///
/// Calendar entries sit outside the hierarchy. Anything unrecognized
/// deserializes as [`EntityType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Course,
    Module,
    Assessment,
    Calendar,
    #[serde(other)]
    Unknown,
}

impl EntityType {
    /// All entity types in hierarchy order.
    pub const ALL: [Self; 5] = [
        Self::Course,
        Self::Module,
        Self::Assessment,
        Self::Calendar,
        Self::Unknown,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::Module => "module",
            Self::Assessment => "assessment",
            Self::Calendar => "calendar",
            Self::Unknown => "unknown",
        }
    }

    /// Position used when grouping records for context assembly.
    ///
    /// Lower ranks come first: course, module, assessment, then the
    /// non-hierarchy kinds.
    #[must_use]
    pub const fn hierarchy_rank(self) -> u8 {
        match self {
            Self::Course => 0,
            Self::Module => 1,
            Self::Assessment => 2,
            Self::Calendar => 3,
            Self::Unknown => 4,
        }
    }

    /// Human-readable label used in rendered context.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Course => "Course",
            Self::Module => "Module",
            Self::Assessment => "Assessment",
            Self::Calendar => "Calendar",
            Self::Unknown => "Record",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "course" | "programme" | "program" => Ok(Self::Course),
            "module" => Ok(Self::Module),
            "assessment" => Ok(Self::Assessment),
            "calendar" => Ok(Self::Calendar),
            "unknown" => Ok(Self::Unknown),
            other => Err(CoreError::UnknownEntityType(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Programme track a course belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Track {
    /// Two-year foundation degree.
    #[serde(rename = "FD")]
    Fd,
    /// Single-year BSc top-up following a foundation degree.
    #[serde(rename = "BSc")]
    Bsc,
}

impl Track {
    /// Label as stored in the `track` metadata field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fd => "FD",
            Self::Bsc => "BSc",
        }
    }

    /// Case-insensitive comparison against a stored metadata label.
    #[must_use]
    pub fn matches_label(self, label: &str) -> bool {
        label.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UpstreamService
// ---------------------------------------------------------------------------

/// External collaborator a request depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamService {
    Embedding,
    VectorSearch,
    Generation,
}

impl UpstreamService {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Embedding => "embedding",
            Self::VectorSearch => "vector_search",
            Self::Generation => "generation",
        }
    }
}

impl fmt::Display for UpstreamService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
