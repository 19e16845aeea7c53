//! Entry lifecycle operations: add, filtered reads, clears, stats.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use tracing::debug;

use crate::error::{MemoryError, Result};
use crate::types::{EmbeddingRecord, KnowledgeEntry, NewEntry, StoreStats, entry_id};

use super::KnowledgeStore;

impl KnowledgeStore {
    /// Add a knowledge entry and return its id.
    ///
    /// Appends the entry, rewrites the entries file, and, when the provider
    /// is available and produces a vector, records the embedding as well.
    /// Adding the same `(source, content)` pair twice appends a second row
    /// with the same id; the store does not de-duplicate.
    ///
    /// Errors only on empty content or source. Persistence failures are
    /// logged and the in-memory add stands.
    pub fn add(&self, input: NewEntry) -> Result<String> {
        if input.content.is_empty() {
            return Err(MemoryError::InvalidData("knowledge content is empty".to_string()));
        }
        if input.source.is_empty() {
            return Err(MemoryError::InvalidData("knowledge source is empty".to_string()));
        }

        let id = entry_id(&input.source, &input.content);
        let entry = KnowledgeEntry {
            id: id.clone(),
            content: input.content,
            source: input.source,
            category: input.category,
            timestamp: Utc::now(),
            metadata: input.metadata,
        };

        // The model call can block on first invocation; keep it outside the
        // lock.
        let embedding = if self.provider().is_available() {
            self.provider().embed(&entry.content)
        } else {
            None
        };

        let mut inner = self.inner.lock().unwrap();
        if let Some(vector) = embedding {
            inner
                .index
                .append(EmbeddingRecord::new(&id, vector, &entry.content));
            self.persist_embeddings(inner.index.records());
        }
        inner.entries.push(entry);
        self.persist_entries(&inner.entries);

        debug!(%id, "Added knowledge entry");
        Ok(id)
    }

    /// Store a document chunk under the `"document"` category.
    pub fn learn_from_document(
        &self,
        content: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<String> {
        self.add(NewEntry::new(content, source).with_category("document"))
    }

    /// Store a voice transcription under the `"conversation"` category.
    pub fn learn_from_transcript(
        &self,
        transcription: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<String> {
        self.add(NewEntry::new(transcription, source).with_category("conversation"))
    }

    /// All entries with the given category, in insertion order.
    pub fn entries_by_category(&self, category: &str) -> Vec<KnowledgeEntry> {
        let inner = self.inner.lock().unwrap();
        inner
            .entries
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    /// Remove all entries with the given category, together with the
    /// embeddings of the removed entries, and rewrite both files.
    pub fn clear_category(&self, category: &str) {
        let mut inner = self.inner.lock().unwrap();

        let removed: HashSet<String> = inner
            .entries
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.id.clone())
            .collect();
        inner.entries.retain(|e| e.category != category);
        inner.index.remove_ids(&removed);

        self.persist_entries(&inner.entries);
        self.persist_embeddings(inner.index.records());

        debug!(category, removed = removed.len(), "Cleared knowledge category");
    }

    /// Remove every entry and every embedding, and rewrite both files.
    pub fn clear_all(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.index.clear();

        self.persist_entries(&inner.entries);
        self.persist_embeddings(inner.index.records());

        debug!("Cleared all knowledge");
    }

    /// Aggregate counts for display.
    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.lock().unwrap();

        let mut categories: BTreeMap<String, usize> = BTreeMap::new();
        for entry in &inner.entries {
            *categories.entry(entry.category.clone()).or_insert(0) += 1;
        }

        StoreStats {
            total_entries: inner.entries.len(),
            categories,
            embeddings_available: !inner.index.is_empty(),
            last_updated: Utc::now(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
