use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use async_trait::async_trait;
use syl_config::SylConfig;
use syl_core::conversation::Turn;
use syl_core::enums::UpstreamService;
use syl_core::errors::UpstreamError;
use syl_core::responses::ChatResponse;
use syl_core::traits::{Embedder, TextGenerator, VectorSearch};
use syl_embeddings::LocalEmbedder;
use syl_generation::ChatCompletionsClient;
use syl_search::AnswerPipeline;
use syl_search::cache::{MemoryResponseStore, ResponseStore};
use syl_search::knowledge::load_knowledge_base;

use crate::cli::GlobalFlags;

/// Whether the command will call the text generator.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GenerationMode {
    Required,
    Disabled,
}

/// Stand-in generator for retrieval-only commands.
struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _history: &[Turn],
        _user_query: &str,
    ) -> Result<String, UpstreamError> {
        Err(UpstreamError::rejected(
            UpstreamService::Generation,
            "generation is disabled for this command",
        ))
    }
}

/// Everything a command needs: configuration and a wired answer pipeline.
pub struct AppContext {
    pub config: SylConfig,
    /// Namespace queried by this invocation.
    pub namespace: String,
    pub pipeline: AnswerPipeline,
}

impl AppContext {
    pub async fn init(
        config: SylConfig,
        flags: &GlobalFlags,
        mode: GenerationMode,
    ) -> anyhow::Result<Self> {
        let knowledge_path = resolve_knowledge_path(flags, &config)?;
        let namespace = flags
            .namespace
            .clone()
            .unwrap_or_else(|| config.general.namespace.clone());

        let generator: Arc<dyn TextGenerator> = match mode {
            GenerationMode::Required => {
                let generation = config
                    .require_generation()
                    .context("set generation.model (or SYLLABUS_GENERATION__MODEL) to answer questions")?;
                Arc::new(
                    ChatCompletionsClient::from_config(generation)
                        .context("failed to build generation client")?,
                )
            }
            GenerationMode::Disabled => Arc::new(DisabledGenerator),
        };

        let embedder = tokio::task::spawn_blocking(LocalEmbedder::new)
            .await
            .context("embedding model loader panicked")?
            .context("failed to load embedding model")?;
        let embedder: Arc<dyn Embedder> = Arc::new(embedder);

        let index = load_knowledge_base(
            &knowledge_path,
            &config.general.namespace,
            embedder.as_ref(),
        )
        .await
        .with_context(|| {
            format!(
                "failed to load knowledge base at {}",
                knowledge_path.display()
            )
        })?;
        if !index.namespaces().contains(&namespace.as_str()) {
            tracing::warn!(
                namespace = namespace.as_str(),
                "namespace has no records in the knowledge base"
            );
        }
        tracing::debug!(
            records = index.len(),
            path = %knowledge_path.display(),
            "knowledge base loaded"
        );
        let index: Arc<dyn VectorSearch> = Arc::new(index);

        let cache: Arc<dyn ResponseStore<ChatResponse>> =
            Arc::new(MemoryResponseStore::from_config(&config.cache));

        let pipeline = AnswerPipeline::new(&config, embedder, index, generator, cache)
            .context("failed to build answer pipeline")?;

        Ok(Self {
            config,
            namespace,
            pipeline,
        })
    }
}

fn resolve_knowledge_path(flags: &GlobalFlags, config: &SylConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = &flags.knowledge {
        return Ok(path.clone());
    }
    if config.knowledge.is_configured() {
        return Ok(PathBuf::from(&config.knowledge.path));
    }
    bail!("no knowledge base configured; pass --knowledge or set knowledge.path")
}
