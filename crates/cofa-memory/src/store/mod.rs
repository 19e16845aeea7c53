//! Knowledge store implementation.
//!
//! Entries and embeddings are persisted as two independent JSON array files,
//! rewritten in full on every mutation. That is O(n) per write, which is
//! acceptable at the scale this store targets (a personal assistant's
//! knowledge base, thousands of entries, not millions); switching to an
//! append-only log with compaction would be a deliberate format change.
//!
//! Durability is best-effort: a failed write is logged and the in-memory
//! mutation stands, and unreadable files at open time yield an empty store.
//! Failures never cross the public boundary (the one exception is `add`
//! rejecting empty content or source).

mod entry_ops;
mod recall;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use cofa_embeddings::SharedProvider;

use crate::error::Result;
use crate::index::EmbeddingIndex;
use crate::types::{EmbeddingRecord, KnowledgeEntry};

pub use recall::{DEFAULT_TOP_K, KEYWORD_MATCH_SCORE, RecallQuery};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// File locations for the two persisted lists.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// JSON array of knowledge entries.
    pub entries_path: PathBuf,
    /// JSON array of embedding records.
    pub embeddings_path: PathBuf,
}

impl StoreConfig {
    /// Place both files under the given directory with the standard names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            entries_path: dir.join("knowledge.json"),
            embeddings_path: dir.join("embeddings.json"),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cofa");
        Self::in_dir(base)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Knowledge Store
// ─────────────────────────────────────────────────────────────────────────────

/// Append-only knowledge store with embedding-backed recall.
///
/// Construct one per process and hand it to consumers by reference; there is
/// no global instance. Mutations (`add`, the clears) serialize through an
/// interior mutex, matching the single-writer model: reads may run
/// concurrently with each other but not with a mutation.
pub struct KnowledgeStore {
    config: StoreConfig,
    provider: SharedProvider,
    pub(crate) inner: Mutex<StoreInner>,
}

pub(crate) struct StoreInner {
    pub(crate) entries: Vec<KnowledgeEntry>,
    pub(crate) index: EmbeddingIndex,
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("config", &self.config)
            .field("provider", &self.provider.name())
            .finish_non_exhaustive()
    }
}

impl KnowledgeStore {
    /// Open the store, loading both persisted files.
    ///
    /// Missing files start empty; unreadable or corrupt files are logged and
    /// also start empty rather than failing the open.
    pub fn open(config: StoreConfig, provider: SharedProvider) -> Self {
        let entries: Vec<KnowledgeEntry> = load_json(&config.entries_path);
        let records: Vec<EmbeddingRecord> = load_json(&config.embeddings_path);

        info!(
            entries = entries.len(),
            embeddings = records.len(),
            provider = provider.name(),
            "Opened knowledge store"
        );

        Self {
            config,
            provider,
            inner: Mutex::new(StoreInner {
                entries,
                index: EmbeddingIndex::from_records(records),
            }),
        }
    }

    /// The embedding provider this store was constructed with.
    pub fn provider(&self) -> &SharedProvider {
        &self.provider
    }

    // ─── Persistence ─────────────────────────────────────────────────────────

    /// Rewrite the entries file. Write failures are logged and swallowed;
    /// the in-memory state already reflects the mutation.
    pub(crate) fn persist_entries(&self, entries: &[KnowledgeEntry]) {
        if let Err(e) = save_json(&self.config.entries_path, &entries) {
            warn!(
                path = %self.config.entries_path.display(),
                "Failed to persist knowledge entries: {}", e
            );
        }
    }

    /// Rewrite the embeddings file, same failure policy as the entries file.
    pub(crate) fn persist_embeddings(&self, records: &[EmbeddingRecord]) {
        if let Err(e) = save_json(&self.config.embeddings_path, &records) {
            warn!(
                path = %self.config.embeddings_path.display(),
                "Failed to persist embeddings: {}", e
            );
        }
    }
}

/// Load a JSON array file, recovering to empty on any failure.
fn load_json<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "Failed to read store file: {}", e);
            return Vec::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(values) => values,
        Err(e) => {
            warn!(path = %path.display(), "Failed to parse store file: {}", e);
            Vec::new()
        }
    }
}

/// Serialize a value to pretty JSON and rewrite the whole file.
fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
