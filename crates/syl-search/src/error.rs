//! Search error types for syl-search.

use syl_core::errors::UpstreamError;

/// Errors raised while building search components or loading knowledge.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// A vocabulary term or built-in pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// The knowledge-base file could not be read.
    #[error("knowledge base I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A knowledge-base line is structurally valid JSON but unusable.
    #[error("invalid knowledge entry '{id}': {reason}")]
    InvalidEntry { id: String, reason: String },

    /// Embedding a knowledge entry failed.
    #[error("embedding error: {0}")]
    Embedding(#[source] UpstreamError),
}

/// Errors that abort a request.
///
/// Only the query embedding and the primary search may fail a request;
/// every other upstream failure is logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Empty or whitespace-only query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl PipelineError {
    /// Whether retrying the same request later may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Upstream(error) => error.is_transient(),
            Self::InvalidQuery(_) => false,
        }
    }
}
