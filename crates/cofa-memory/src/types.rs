//! Knowledge entry types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Category assigned when the caller supplies none (or an empty string).
pub const DEFAULT_CATEGORY: &str = "general";

/// Length of the content preview stored alongside each embedding record.
pub const PREVIEW_CHARS: usize = 100;

/// Open key/value map for caller-supplied structured data; opaque to the
/// store.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// ─────────────────────────────────────────────────────────────────────────────
// Entry Id
// ─────────────────────────────────────────────────────────────────────────────

/// Deterministic entry id: `{source}_{first 8 hex chars of md5(content)}`.
///
/// Stable across re-insertions of identical content from the same source,
/// but not guaranteed globally unique: two different contents hashing to the
/// same 8-char prefix under the same source collide. That is a known
/// limitation of the scheme, not detected here.
pub fn entry_id(source: &str, content: &str) -> String {
    let digest = md5::compute(content.as_bytes());
    let hex = format!("{:x}", digest);
    format!("{}_{}", source, &hex[..8])
}

// ─────────────────────────────────────────────────────────────────────────────
// Knowledge Entry
// ─────────────────────────────────────────────────────────────────────────────

/// One stored unit of text with provenance metadata.
///
/// Entries are append-only: created by `add`, never mutated in place,
/// removed only by the explicit clear operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: String,
    pub content: String,
    /// Provenance label (filename, chunk label, "Drive_<timestamp>", ...).
    pub source: String,
    /// Coarse domain tag ("lead", "product", "document", ...).
    pub category: String,
    /// Creation time, immutable.
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Builder for a new knowledge entry handed to `KnowledgeStore::add`.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub content: String,
    pub source: String,
    pub category: String,
    pub metadata: Metadata,
}

impl NewEntry {
    /// Create a new entry with the default category.
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            category: DEFAULT_CATEGORY.to_string(),
            metadata: Metadata::new(),
        }
    }

    /// Set the category. An empty string keeps the default.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        if !category.is_empty() {
            self.category = category;
        }
        self
    }

    /// Replace the metadata map.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a single metadata key/value pair.
    pub fn with_metadata_value(
        mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Embedding Record
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted id→vector record, one per embedded entry.
///
/// The preview is stored for diagnostic display only and takes no part in
/// scoring. Serialized under the JSON key `content` in the embeddings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(rename = "content")]
    pub content_preview: String,
}

impl EmbeddingRecord {
    /// Create a record, truncating the preview to [`PREVIEW_CHARS`].
    pub fn new(id: impl Into<String>, embedding: Vec<f32>, content: &str) -> Self {
        Self {
            id: id.into(),
            embedding: Some(embedding),
            content_preview: content.chars().take(PREVIEW_CHARS).collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Search & Stats
// ─────────────────────────────────────────────────────────────────────────────

/// One recall result: the entry plus its relevance score.
///
/// Semantic matches carry a cosine similarity in `[-1.0, 1.0]`; keyword
/// fallback matches carry the fixed sentinel score `0.5`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub entry: KnowledgeEntry,
    pub similarity: f32,
}

/// Read-only aggregate over the store, for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total_entries: usize,
    /// Entry count per category.
    pub categories: BTreeMap<String, usize>,
    /// Whether any embedding records currently exist. This reflects stored
    /// state, not whether the provider is usable right now.
    pub embeddings_available: bool,
    pub last_updated: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
