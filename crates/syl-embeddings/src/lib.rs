//! # syl-embeddings
//!
//! Local embedding of queries and knowledge-base records using fastembed
//! (ONNX runtime). No API key is required.
//!
//! ## Model
//!
//! Uses [`AllMiniLML6V2`](fastembed::EmbeddingModel::AllMiniLML6V2):
//! - 384-dimensional output vectors
//! - no query/passage prefix needed
//! - ~80MB model, cached at `~/.syllabus/cache/fastembed/`
//!
//! [`EmbeddingEngine`] is synchronous. [`LocalEmbedder`] wraps it for the
//! async [`Embedder`] trait by running inference on the blocking pool.

pub mod error;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
pub use error::EmbeddingError;
use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};
use syl_core::errors::UpstreamError;
use syl_core::traits::Embedder;

/// Fastembed model wrapper producing 384-dimensional vectors.
pub struct EmbeddingEngine {
    model: TextEmbedding,
}

impl EmbeddingEngine {
    /// Load the model, downloading it on first run.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if download or ONNX setup fails.
    pub fn new() -> Result<Self, EmbeddingError> {
        Self::with_cache_dir(Self::default_cache_dir())
    }

    /// Load the model from (or into) `cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if download or ONNX setup fails.
    pub fn with_cache_dir(cache_dir: PathBuf) -> Result<Self, EmbeddingError> {
        tracing::debug!(cache_dir = %cache_dir.display(), "loading embedding model");
        let model = TextEmbedding::try_new(
            TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(false),
        )
        .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self { model })
    }

    /// `~/.syllabus/cache/fastembed`, or `.fastembed_cache` without a home dir.
    #[must_use]
    pub fn default_cache_dir() -> PathBuf {
        dirs::home_dir().map_or_else(
            || PathBuf::from(".fastembed_cache"),
            |h| h.join(".syllabus").join("cache").join("fastembed"),
        )
    }

    /// Embed a batch of texts, one vector per input.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if inference fails.
    pub fn embed_batch(&mut self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.model
            .embed(texts, None)
            .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))
    }

    /// Embed one text.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::EmbedFailed`] if inference fails, or
    /// [`EmbeddingError::EmptyResult`] if the model returns nothing.
    pub fn embed_single(&mut self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut results = self.embed_batch(vec![text.to_string()])?;
        results.pop().ok_or(EmbeddingError::EmptyResult)
    }

    #[must_use]
    pub const fn dimension() -> usize {
        384
    }
}

/// [`Embedder`] backed by a shared [`EmbeddingEngine`].
///
/// Cloning is cheap; clones share the loaded model.
#[derive(Clone)]
pub struct LocalEmbedder {
    engine: Arc<Mutex<EmbeddingEngine>>,
}

impl LocalEmbedder {
    /// Load the model into the default cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if the model cannot be loaded.
    pub fn new() -> Result<Self, EmbeddingError> {
        Ok(Self::from_engine(EmbeddingEngine::new()?))
    }

    #[must_use]
    pub fn from_engine(engine: EmbeddingEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Embed many texts on the blocking pool in one inference call.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError`] if inference fails or the worker panics.
    pub async fn embed_many(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            engine
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .embed_batch(texts)
        })
        .await
        .map_err(|e| EmbeddingError::WorkerFailed(e.to_string()))?
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        let engine = Arc::clone(&self.engine);
        let text = text.to_string();
        let result = tokio::task::spawn_blocking(move || {
            engine
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .embed_single(&text)
        })
        .await
        .map_err(|e| EmbeddingError::WorkerFailed(e.to_string()))
        .and_then(|inner| inner);

        result.map_err(|error| {
            tracing::warn!(%error, "query embedding failed");
            UpstreamError::from(error)
        })
    }
}
