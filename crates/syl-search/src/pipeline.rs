//! End-to-end answer pipeline: cache, extraction, retrieval, analysis,
//! suggestions, context assembly and generation.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use syl_config::SylConfig;
use syl_core::conversation::{ConversationContext, Turn};
use syl_core::record::Record;
use syl_core::responses::{ChatResponse, SourceSummary};
use syl_core::suggestion::Suggestion;
use syl_core::traits::{Embedder, TextGenerator, VectorSearch};

use crate::ambiguity::{AmbiguityAnalyzer, AmbiguityReport};
use crate::assembler::{AssembledContext, ContextAssembler};
use crate::cache::ResponseStore;
use crate::error::{PipelineError, SearchError};
use crate::extractor::{ContextStrategy, KeywordContextExtractor};
use crate::orchestrator::{RetrievalOrchestrator, RetrievalOutcome, rewrite_query};
use crate::suggestions::SuggestionBuilder;

const SYSTEM_PREAMBLE: &str = "You are a course information assistant for students. \
Answer only from the knowledge-base context below and say so when it does not contain the answer. \
If the context includes an ambiguity notice, follow its instruction before anything else.";

/// System prompt with the assembled context appended.
#[must_use]
pub fn system_prompt(context: &str) -> String {
    format!("{SYSTEM_PREAMBLE}\n\n{context}")
}

/// Everything retrieval produced for a query, without generation.
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    pub context: ConversationContext,
    pub rewritten_query: String,
    pub no_match: bool,
    pub records: Vec<Record>,
    pub ambiguity: AmbiguityReport,
    pub suggestions: Vec<Suggestion>,
    pub assembled: AssembledContext,
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Answers queries against one knowledge base.
pub struct AnswerPipeline {
    extractor: Arc<dyn ContextStrategy>,
    orchestrator: RetrievalOrchestrator,
    analyzer: AmbiguityAnalyzer,
    suggestions: SuggestionBuilder,
    assembler: ContextAssembler,
    generator: Arc<dyn TextGenerator>,
    cache: Arc<dyn ResponseStore<ChatResponse>>,
    history_turns: usize,
    display_sources: usize,
}

impl AnswerPipeline {
    /// Wire the pipeline from configuration and collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Pattern`] if the built-in vocabulary fails to
    /// compile.
    pub fn new(
        config: &SylConfig,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorSearch>,
        generator: Arc<dyn TextGenerator>,
        cache: Arc<dyn ResponseStore<ChatResponse>>,
    ) -> Result<Self, SearchError> {
        let extractor = KeywordContextExtractor::with_defaults(config.general.history_turns)?;
        Ok(Self {
            extractor: Arc::new(extractor),
            orchestrator: RetrievalOrchestrator::new(embedder, index, config.retrieval.clone()),
            analyzer: AmbiguityAnalyzer::new(config.ambiguity.clone()),
            suggestions: SuggestionBuilder::new(config.suggestions.clone()),
            assembler: ContextAssembler::new(config.assembler.clone()),
            generator,
            cache,
            history_turns: config.general.history_turns,
            display_sources: config.general.display_sources,
        })
    }

    /// Replace the context extraction strategy.
    #[must_use]
    pub fn with_strategy(mut self, extractor: Arc<dyn ContextStrategy>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Drop every cached response.
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("response cache cleared");
    }

    fn recent<'a>(&self, history: &'a [Turn]) -> &'a [Turn] {
        &history[history.len().saturating_sub(self.history_turns)..]
    }

    /// Run retrieval, analysis and assembly without calling the generator.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidQuery`] for an empty query and
    /// [`PipelineError::Upstream`] when embedding or the primary search fails.
    pub async fn inspect(
        &self,
        query: &str,
        history: &[Turn],
        namespace: &str,
    ) -> Result<Inspection, PipelineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PipelineError::InvalidQuery("query is empty".into()));
        }

        let context = self.extractor.extract(query, self.recent(history));
        let outcome = self.orchestrator.retrieve(query, &context, namespace).await?;

        let (records, ambiguity, suggestions, assembled) = match outcome {
            RetrievalOutcome::Records(records) => {
                let ambiguity = self.analyzer.analyze(&records, query);
                let suggestions = self.suggestions.build(&ambiguity, &context, query);
                let assembled = self.assembler.assemble(&records, &ambiguity);
                (records, ambiguity, suggestions, assembled)
            }
            RetrievalOutcome::NoMatch => (
                Vec::new(),
                AmbiguityReport::default(),
                Vec::new(),
                self.assembler.no_match(),
            ),
        };

        Ok(Inspection {
            rewritten_query: rewrite_query(query, &context),
            no_match: records.is_empty(),
            context,
            records,
            ambiguity,
            suggestions,
            assembled,
        })
    }

    /// Answer `query`, serving from the cache when possible.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidQuery`] for an empty query and
    /// [`PipelineError::Upstream`] when embedding, the primary search or
    /// generation fails. Failed requests are never cached.
    pub async fn answer(
        &self,
        query: &str,
        history: &[Turn],
        namespace: &str,
    ) -> Result<ChatResponse, PipelineError> {
        let started = Instant::now();

        if let Some(mut cached) = self.cache.get(namespace, query) {
            tracing::info!(namespace, "response cache hit");
            cached.cached = true;
            cached.latency_ms = elapsed_ms(started);
            return Ok(cached);
        }
        tracing::info!(namespace, "response cache miss");

        let inspection = self.inspect(query, history, namespace).await?;
        if inspection.no_match {
            tracing::info!(namespace, "no relevant records, generating fallback answer");
        }

        let prompt = system_prompt(&inspection.assembled.text);
        let answer_text = self
            .generator
            .generate(&prompt, self.recent(history), query.trim())
            .await?;

        let response = ChatResponse {
            answer_text,
            sources: inspection
                .records
                .iter()
                .take(self.display_sources)
                .map(SourceSummary::from)
                .collect(),
            suggestions: inspection.suggestions,
            cached: false,
            latency_ms: elapsed_ms(started),
        };
        self.cache.set(namespace, query, response.clone());
        Ok(response)
    }
}
