//! # syl-core
//!
//! Core types, collaborator traits, and error types for syllabus.
//!
//! This crate provides the foundational types shared across all syllabus crates:
//! - Retrievable [`record::Record`]s and the exact-match [`record::MetadataFilter`]
//! - Entity type, course track, and conversation role enums
//! - The per-request [`conversation::ConversationContext`] snapshot
//! - User-facing disambiguation [`suggestion::Suggestion`]s
//! - The [`responses::ChatResponse`] handed to presentation layers
//! - Async traits for the embedding, vector-search, and text-generation services
//! - Cross-cutting error types

pub mod conversation;
pub mod enums;
pub mod errors;
pub mod record;
pub mod responses;
pub mod suggestion;
pub mod traits;
