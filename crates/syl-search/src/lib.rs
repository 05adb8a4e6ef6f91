//! # syl-search
//!
//! Retrieval and disambiguation for syllabus.
//!
//! A request flows through:
//! - [`extractor`]: track / year / module / assessment hints from the query and history
//! - [`orchestrator`]: primary, relaxed, calendar, hierarchy and secondary searches, merged
//! - [`ambiguity`]: clusters of near-equally relevant records
//! - [`suggestions`]: up to three clickable disambiguation options
//! - [`assembler`]: the bounded context block given to the generator
//! - [`pipeline`]: all of the above plus the [`cache`] and generation
//!
//! [`memory_index`] and [`knowledge`] provide an in-process vector index
//! loaded from a JSONL knowledge base.

pub mod ambiguity;
pub mod assembler;
pub mod cache;
pub mod error;
pub mod extractor;
pub mod intent;
pub mod knowledge;
pub mod memory_index;
pub mod orchestrator;
pub mod pipeline;
pub mod suggestions;
pub mod vocabulary;

pub use error::{PipelineError, SearchError};
pub use pipeline::{AnswerPipeline, Inspection};
