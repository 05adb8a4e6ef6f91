//! Cross-cutting error types for syllabus.
//!
//! [`UpstreamError`] is the single error shape every collaborator trait
//! returns, so the pipeline can tell transient outages apart from rejected
//! requests without knowing which vendor sits behind the trait. Crate-specific
//! errors (`ConfigError`, `EmbeddingError`, `SearchError`) live in their
//! respective crates.

use std::fmt;

use thiserror::Error;

use crate::enums::UpstreamService;

/// Errors raised while validating core domain values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An entity type label did not match any known kind.
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Whether an upstream failure is worth retrying later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// Network, quota, or availability failure.
    Transient,
    /// The service understood the request and refused it.
    Rejected,
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => f.write_str("unavailable"),
            Self::Rejected => f.write_str("rejected the request"),
        }
    }
}

/// Failure reported by an embedding, vector-search, or generation service.
#[derive(Debug, Clone, Error)]
#[error("{service} service {kind}: {message}")]
pub struct UpstreamError {
    pub service: UpstreamService,
    pub kind: UpstreamErrorKind,
    pub message: String,
}

impl UpstreamError {
    /// A retryable failure (network, quota, timeout).
    #[must_use]
    pub fn transient(service: UpstreamService, message: impl Into<String>) -> Self {
        Self {
            service,
            kind: UpstreamErrorKind::Transient,
            message: message.into(),
        }
    }

    /// A non-retryable failure (bad request, authentication).
    #[must_use]
    pub fn rejected(service: UpstreamService, message: impl Into<String>) -> Self {
        Self {
            service,
            kind: UpstreamErrorKind::Rejected,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.kind, UpstreamErrorKind::Transient)
    }
}
