//! JSONL knowledge-base loading.
//!
//! Each line is one [`KnowledgeEntry`]. Entries without a stored embedding
//! are embedded from their display text while loading.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use syl_core::enums::{EntityType, Track};
use syl_core::record::{Record, fields, normalize_year};
use syl_core::traits::Embedder;

use crate::error::SearchError;
use crate::memory_index::MemoryIndex;

/// One line of a knowledge-base file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    /// Falls back to the loader's default namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub entity_type: EntityType,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl KnowledgeEntry {
    /// Record with year and track stored in the form filters compare against.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut values = self.fields.clone();
        if let Some(year) = values.get_mut(fields::YEAR) {
            *year = normalize_year(year);
        }
        if let Some(track) = values.get_mut(fields::TRACK) {
            if let Some(known) = [Track::Fd, Track::Bsc].into_iter().find(|t| t.matches_label(track)) {
                *track = known.as_str().to_string();
            }
        }
        Record {
            id: self.id.clone(),
            score: 0.0,
            entity_type: self.entity_type,
            fields: values,
        }
    }

    /// Text embedded when the entry carries no vector.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        let record = self.to_record();
        let details: Vec<String> = record
            .fields
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect();
        format!(
            "{} {}. {}",
            record.entity_type.label(),
            record.display_title(),
            details.join("; ")
        )
    }
}

/// Read every entry from a JSONL file.
///
/// # Errors
///
/// Returns [`SearchError::Io`] when the file cannot be read or a line is not
/// a valid entry, and [`SearchError::InvalidEntry`] for an empty id.
pub fn read_entries(path: &Path) -> Result<Vec<KnowledgeEntry>, SearchError> {
    let entries: Vec<KnowledgeEntry> =
        serde_jsonlines::json_lines(path)?.collect::<std::io::Result<Vec<_>>>()?;
    if let Some(bad) = entries.iter().find(|e| e.id.trim().is_empty()) {
        return Err(SearchError::InvalidEntry {
            id: bad.id.clone(),
            reason: "id must not be empty".into(),
        });
    }
    Ok(entries)
}

/// Build a [`MemoryIndex`], embedding entries that lack a vector.
///
/// # Errors
///
/// Returns [`SearchError::Embedding`] if embedding fails, or
/// [`SearchError::InvalidEntry`] when vector dimensions disagree.
pub async fn build_index(
    entries: Vec<KnowledgeEntry>,
    default_namespace: &str,
    embedder: &dyn Embedder,
) -> Result<MemoryIndex, SearchError> {
    let mut index = MemoryIndex::new();
    let mut dimension: Option<usize> = None;
    let mut embedded = 0usize;

    for entry in entries {
        let embedding = match &entry.embedding {
            Some(vector) => vector.clone(),
            None => {
                embedded += 1;
                embedder
                    .embed(&entry.embedding_text())
                    .await
                    .map_err(SearchError::Embedding)?
            }
        };

        match dimension {
            Some(expected) if expected != embedding.len() => {
                return Err(SearchError::InvalidEntry {
                    id: entry.id,
                    reason: format!("embedding has {} dimensions, expected {expected}", embedding.len()),
                });
            }
            None => dimension = Some(embedding.len()),
            Some(_) => {}
        }

        let namespace = entry
            .namespace
            .clone()
            .unwrap_or_else(|| default_namespace.to_string());
        index.insert(namespace, entry.to_record(), embedding);
    }

    tracing::debug!(records = index.len(), embedded, "knowledge base indexed");
    Ok(index)
}

/// Read and index a knowledge-base file.
///
/// # Errors
///
/// See [`read_entries`] and [`build_index`].
pub async fn load_knowledge_base(
    path: &Path,
    default_namespace: &str,
    embedder: &dyn Embedder,
) -> Result<MemoryIndex, SearchError> {
    let entries = read_entries(path)?;
    build_index(entries, default_namespace, embedder).await
}
