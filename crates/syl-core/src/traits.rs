//! Collaborator interfaces consumed by the retrieval pipeline.
//!
//! Each service is a trait object so tests can substitute in-memory fakes and
//! deployments can swap vendors without touching the pipeline.

use async_trait::async_trait;

use crate::conversation::Turn;
use crate::errors::UpstreamError;
use crate::record::{MetadataFilter, Record};

/// Turns text into an embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] on model, quota, or network failure.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError>;
}

/// Parameters for one vector search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Maximum number of records to return.
    pub top_k: usize,
    /// Dataset / tenant scope.
    pub namespace: String,
    /// Exact-match constraints; empty means unfiltered.
    pub filter: MetadataFilter,
    /// Records scoring below this are excluded.
    pub min_score: f64,
}

/// Semantic search over the knowledge base.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Return up to `params.top_k` records ordered by descending score.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] when the index cannot be queried.
    async fn search(
        &self,
        vector: &[f32],
        params: &SearchParams,
    ) -> Result<Vec<Record>, UpstreamError>;
}

/// Produces the final answer text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply to `user_query` given the system prompt and history.
    ///
    /// # Errors
    ///
    /// Returns an [`UpstreamError`] on network, quota, or API failure.
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[Turn],
        user_query: &str,
    ) -> Result<String, UpstreamError>;
}
