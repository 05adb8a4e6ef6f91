//! Scripted collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use syl_core::conversation::Turn;
use syl_core::enums::{EntityType, UpstreamService};
use syl_core::errors::UpstreamError;
use syl_core::record::{Record, fields};
use syl_core::traits::{Embedder, SearchParams, TextGenerator, VectorSearch};

pub struct FixedEmbedder;

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, UpstreamError> {
        Ok(vec![1.0, 0.0])
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, UpstreamError> {
        Err(UpstreamError::transient(UpstreamService::Embedding, "quota exceeded"))
    }
}

type Responder = dyn Fn(&SearchParams) -> Result<Vec<Record>, UpstreamError> + Send + Sync;

/// Answers each search from a closure and records the parameters it saw.
pub struct ScriptedSearch {
    responder: Box<Responder>,
    delay_module: Option<(String, Duration)>,
    pub calls: Mutex<Vec<SearchParams>>,
}

impl ScriptedSearch {
    pub fn new(
        responder: impl Fn(&SearchParams) -> Result<Vec<Record>, UpstreamError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            delay_module: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delay searches filtered on `module_code` so they finish last.
    pub fn delaying(mut self, module_code: &str, delay: Duration) -> Self {
        self.delay_module = Some((module_code.to_string(), delay));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VectorSearch for ScriptedSearch {
    async fn search(
        &self,
        _vector: &[f32],
        params: &SearchParams,
    ) -> Result<Vec<Record>, UpstreamError> {
        self.calls.lock().unwrap().push(params.clone());
        if let Some((code, delay)) = &self.delay_module {
            if filter_value(params, fields::MODULE_CODE) == Some(code.as_str()) {
                tokio::time::sleep(*delay).await;
            }
        }
        (self.responder)(params)
    }
}

/// Records every prompt and returns a fixed reply.
pub struct RecordingGenerator {
    pub reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(
        &self,
        system_prompt: &str,
        _history: &[Turn],
        _user_query: &str,
    ) -> Result<String, UpstreamError> {
        self.prompts.lock().unwrap().push(system_prompt.to_string());
        Ok(self.reply.clone())
    }
}

pub fn filter_value<'a>(params: &'a SearchParams, key: &str) -> Option<&'a str> {
    params.filter.fields.get(key).map(String::as_str)
}

pub fn transient(message: &str) -> UpstreamError {
    UpstreamError::transient(UpstreamService::VectorSearch, message)
}

pub fn module(id: &str, title: &str, code: &str, year: &str, score: f64) -> Record {
    Record::new(id, EntityType::Module, score)
        .with_field(fields::TITLE, title)
        .with_field(fields::MODULE_CODE, code)
        .with_field(fields::COURSE_CODE, "FDCOMP")
        .with_field(fields::YEAR, year)
}

pub fn assessment(id: &str, module_code: &str, kind: &str, score: f64) -> Record {
    Record::new(id, EntityType::Assessment, score)
        .with_field(fields::MODULE_CODE, module_code)
        .with_field(fields::ASSESSMENT_TYPE, kind)
}
