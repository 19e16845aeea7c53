//! In-memory embedding index over the persisted record list.
//!
//! The embeddings file is a flat JSON array; scanning it per query would be
//! O(n) per entry. The index rebuilds an id→vector map at load time so recall
//! does an O(1) lookup per candidate entry.

use std::collections::{HashMap, HashSet};

use crate::types::EmbeddingRecord;

/// Persisted embedding records plus their id→vector lookup.
///
/// A derived, dependent structure: the entry store owns entry lifecycles, and
/// whenever entries are removed their embeddings must be removed here in the
/// same operation so no orphaned vectors remain.
#[derive(Debug, Default)]
pub struct EmbeddingIndex {
    records: Vec<EmbeddingRecord>,
    lookup: HashMap<String, Vec<f32>>,
}

impl EmbeddingIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from records loaded off disk.
    ///
    /// Records without a vector stay in the list (they round-trip back to
    /// disk) but get no lookup slot. Duplicate ids keep the last vector.
    pub fn from_records(records: Vec<EmbeddingRecord>) -> Self {
        let mut lookup = HashMap::with_capacity(records.len());
        for record in &records {
            if let Some(ref embedding) = record.embedding {
                lookup.insert(record.id.clone(), embedding.clone());
            }
        }
        Self { records, lookup }
    }

    /// Append one record and update the lookup.
    pub fn append(&mut self, record: EmbeddingRecord) {
        if let Some(ref embedding) = record.embedding {
            self.lookup.insert(record.id.clone(), embedding.clone());
        }
        self.records.push(record);
    }

    /// O(1) vector lookup by entry id.
    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.lookup.get(id).map(|v| v.as_slice())
    }

    /// Remove all records whose id is in the set, from both the record list
    /// and the lookup.
    pub fn remove_ids(&mut self, ids: &HashSet<String>) {
        self.records.retain(|r| !ids.contains(&r.id));
        self.lookup.retain(|id, _| !ids.contains(id));
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.records.clear();
        self.lookup.clear();
    }

    /// The full record list, for persistence.
    pub fn records(&self) -> &[EmbeddingRecord] {
        &self.records
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether any records exist.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
