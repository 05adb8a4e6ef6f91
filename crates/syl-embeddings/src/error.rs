//! Error types for local embedding.

use syl_core::enums::UpstreamService;
use syl_core::errors::UpstreamError;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    InitFailed(String),

    #[error("Embedding failed: {0}")]
    EmbedFailed(String),

    #[error("Model returned no embedding")]
    EmptyResult,

    #[error("Embedding worker stopped: {0}")]
    WorkerFailed(String),
}

impl From<EmbeddingError> for UpstreamError {
    /// Every local model failure is worth retrying on a later request.
    fn from(error: EmbeddingError) -> Self {
        Self::transient(UpstreamService::Embedding, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_transient_upstream_error() {
        let upstream = UpstreamError::from(EmbeddingError::EmptyResult);
        assert!(upstream.is_transient());
        assert_eq!(upstream.service, UpstreamService::Embedding);
        assert!(upstream.message.contains("no embedding"));
    }
}
