//! Relevance recall: semantic ranking with a keyword fallback.

use tracing::debug;

use cofa_embeddings::cosine_similarity;

use crate::types::{KnowledgeEntry, SearchHit};

use super::KnowledgeStore;

/// Results returned when the caller does not ask for a count.
pub const DEFAULT_TOP_K: usize = 5;

/// Fixed score assigned to keyword-fallback matches. A sentinel meaning
/// "matched, but with no ranking signal".
pub const KEYWORD_MATCH_SCORE: f32 = 0.5;

// ─────────────────────────────────────────────────────────────────────────────
// Recall Query
// ─────────────────────────────────────────────────────────────────────────────

/// A recall request against the knowledge store.
///
/// # Example
///
/// ```ignore
/// let query = RecallQuery::new("product pricing")
///     .with_top_k(3)
///     .with_category("product");
/// let hits = store.recall(&query);
/// ```
#[derive(Debug, Clone)]
pub struct RecallQuery {
    /// Free-text query.
    pub text: String,
    /// Maximum number of results.
    pub top_k: usize,
    /// Keep only entries with this exact category.
    pub category: Option<String>,
    /// Restrict by provenance: a filter ending in `_` is a prefix match on
    /// `source` (e.g. `"Drive_"` matches every Drive upload), anything else
    /// is a substring containment match.
    pub source_filter: Option<String>,
}

impl RecallQuery {
    /// Create a query with the default result count.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            top_k: DEFAULT_TOP_K,
            category: None,
            source_filter: None,
        }
    }

    /// Set the maximum number of results.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Filter by category. An empty string means no filter.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (!category.is_empty()).then_some(category);
        self
    }

    /// Filter by source. An empty string means no filter.
    pub fn with_source_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        self.source_filter = (!filter.is_empty()).then_some(filter);
        self
    }

    fn matches(&self, entry: &KnowledgeEntry) -> bool {
        if let Some(ref category) = self.category
            && entry.category != *category
        {
            return false;
        }
        match self.source_filter.as_deref() {
            Some(filter) if filter.ends_with('_') => entry.source.starts_with(filter),
            Some(filter) => entry.source.contains(filter),
            None => true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recall
// ─────────────────────────────────────────────────────────────────────────────

impl KnowledgeStore {
    /// Rank stored entries by relevance to the query, best first.
    ///
    /// With an available embedding provider, candidates are scored by cosine
    /// similarity between the query embedding and each entry's indexed
    /// vector; entries without a vector are skipped, not scored as zero.
    /// When no semantic score can be produced at all (provider unavailable,
    /// query embedding failed, or no candidate has a vector), matching falls
    /// back to lowercase keyword containment at the fixed
    /// [`KEYWORD_MATCH_SCORE`], in insertion order.
    ///
    /// Infallible by design: internal failures degrade to the fallback or to
    /// an empty result, which is indistinguishable from "no matches".
    pub fn recall(&self, query: &RecallQuery) -> Vec<SearchHit> {
        // The model call can block; keep it outside the lock.
        let query_embedding = if self.provider().is_available() {
            self.provider().embed(&query.text)
        } else {
            None
        };

        let inner = self.inner.lock().unwrap();
        let filtered: Vec<&KnowledgeEntry> =
            inner.entries.iter().filter(|e| query.matches(e)).collect();
        if filtered.is_empty() {
            return Vec::new();
        }

        if let Some(ref query_vector) = query_embedding {
            let mut hits: Vec<SearchHit> = filtered
                .iter()
                .filter_map(|entry| {
                    inner.index.get(&entry.id).map(|vector| SearchHit {
                        entry: (*entry).clone(),
                        similarity: cosine_similarity(query_vector, vector),
                    })
                })
                .collect();

            if !hits.is_empty() {
                // Stable sort: ties keep the filtered enumeration order, so
                // equal scores come back in insertion order across runs.
                hits.sort_by(|a, b| {
                    b.similarity
                        .partial_cmp(&a.similarity)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                hits.truncate(query.top_k);
                debug!(query = %query.text, results = hits.len(), "Semantic recall");
                return hits;
            }
        }

        // Keyword fallback: an entry matches if any query word appears as a
        // substring of its lowercased content. First-match order, no ranking.
        let text = query.text.to_lowercase();
        let words: Vec<&str> = text.split_whitespace().collect();
        let hits: Vec<SearchHit> = filtered
            .iter()
            .filter(|entry| {
                let content = entry.content.to_lowercase();
                words.iter().any(|word| content.contains(word))
            })
            .take(query.top_k)
            .map(|entry| SearchHit {
                entry: (*entry).clone(),
                similarity: KEYWORD_MATCH_SCORE,
            })
            .collect();
        debug!(query = %query.text, results = hits.len(), "Keyword recall");
        hits
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cofa_embeddings::{DisabledProvider, EmbeddingProvider, SharedProvider};
    use tempfile::TempDir;

    use super::*;
    use crate::store::StoreConfig;
    use crate::types::NewEntry;

    /// Embeds by topic keyword so tests control similarity exactly.
    struct TopicProvider;

    impl EmbeddingProvider for TopicProvider {
        fn is_available(&self) -> bool {
            true
        }

        fn embed(&self, text: &str) -> Option<Vec<f32>> {
            let text = text.to_lowercase();
            let mut vector = vec![0.0f32; 3];
            if text.contains("product") || text.contains("pricing") || text.contains("costs") {
                vector[0] = 1.0;
            }
            if text.contains("lead") || text.contains("corp") {
                vector[1] = 1.0;
            }
            if text.contains("demo") {
                vector[2] = 1.0;
            }
            Some(vector)
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "topic"
        }
    }

    /// Claims availability but never produces a vector.
    struct FlakyProvider;

    impl EmbeddingProvider for FlakyProvider {
        fn is_available(&self) -> bool {
            true
        }

        fn embed(&self, _text: &str) -> Option<Vec<f32>> {
            None
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn open_with(dir: &TempDir, provider: SharedProvider) -> KnowledgeStore {
        KnowledgeStore::open(StoreConfig::in_dir(dir.path()), provider)
    }

    fn seed_scenario(store: &KnowledgeStore) {
        store
            .add(NewEntry::new("Our premium product costs $999", "catalog")
                .with_category("product"))
            .unwrap();
        store
            .add(NewEntry::new("ABC Corp lead showed interest", "notes").with_category("lead"))
            .unwrap();
        store
            .add(NewEntry::new("XYZ Corp needs a demo", "notes2").with_category("lead"))
            .unwrap();
    }

    #[test]
    fn test_semantic_recall_ranks_by_similarity() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(TopicProvider));
        seed_scenario(&store);

        let hits = store.recall(&RecallQuery::new("product pricing").with_top_k(2));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].entry.source, "catalog");
        assert!(hits[0].similarity > hits[1].similarity);
        assert!((hits[0].similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_semantic_tie_keeps_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(TopicProvider));
        seed_scenario(&store);

        // Both lead entries score identically against a product query; the
        // stable sort must keep their insertion order.
        let hits = store.recall(&RecallQuery::new("product pricing").with_top_k(3));
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[1].entry.source, "notes");
        assert_eq!(hits[2].entry.source, "notes2");
    }

    #[test]
    fn test_keyword_fallback_when_provider_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(DisabledProvider));
        store.add(NewEntry::new("Our pricing is $10", "a")).unwrap();
        store.add(NewEntry::new("No relation", "b")).unwrap();

        let hits = store.recall(&RecallQuery::new("pricing"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.content, "Our pricing is $10");
        assert_eq!(hits[0].similarity, KEYWORD_MATCH_SCORE);
    }

    #[test]
    fn test_fallback_scenario_product_query() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(DisabledProvider));
        seed_scenario(&store);

        // "product" matches only the catalog entry's content.
        let hits = store.recall(&RecallQuery::new("product pricing").with_top_k(2));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.source, "catalog");
    }

    #[test]
    fn test_fallback_when_query_embedding_fails() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(FlakyProvider));
        store.add(NewEntry::new("Our pricing is $10", "a")).unwrap();

        let hits = store.recall(&RecallQuery::new("pricing"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].similarity, KEYWORD_MATCH_SCORE);
    }

    #[test]
    fn test_fallback_when_no_entry_has_a_vector() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::in_dir(dir.path());

        // Entries ingested while no model was present...
        {
            let store = KnowledgeStore::open(config.clone(), Arc::new(DisabledProvider));
            store.add(NewEntry::new("Our pricing is $10", "a")).unwrap();
        }

        // ...still recall by keyword after a model shows up.
        let store = KnowledgeStore::open(config, Arc::new(TopicProvider));
        let hits = store.recall(&RecallQuery::new("pricing"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].similarity, KEYWORD_MATCH_SCORE);
    }

    #[test]
    fn test_entries_without_vectors_skipped_in_semantic_recall() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::in_dir(dir.path());

        {
            let store = KnowledgeStore::open(config.clone(), Arc::new(DisabledProvider));
            store.add(NewEntry::new("unembedded pricing note", "old")).unwrap();
        }

        let store = KnowledgeStore::open(config, Arc::new(TopicProvider));
        store
            .add(NewEntry::new("Our premium product costs $999", "catalog"))
            .unwrap();

        // The embedded entry is scored; the unembedded one is skipped rather
        // than scored as zero.
        let hits = store.recall(&RecallQuery::new("product pricing"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.source, "catalog");
    }

    #[test]
    fn test_category_filter() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(DisabledProvider));
        seed_scenario(&store);

        let hits = store.recall(&RecallQuery::new("corp").with_category("lead"));
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.entry.category == "lead"));
    }

    #[test]
    fn test_source_prefix_filter() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(DisabledProvider));
        store
            .add(NewEntry::new("quarterly pricing sheet", "Drive_20260801"))
            .unwrap();
        store
            .add(NewEntry::new("pricing from an email", "inbox_message"))
            .unwrap();

        let hits = store.recall(&RecallQuery::new("pricing").with_source_filter("Drive_"));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].entry.source.starts_with("Drive_"));
    }

    #[test]
    fn test_source_substring_filter() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(DisabledProvider));
        store
            .add(NewEntry::new("pricing chunk", "report.pdf_chunk_2"))
            .unwrap();
        store.add(NewEntry::new("pricing note", "notes")).unwrap();

        let hits = store.recall(&RecallQuery::new("pricing").with_source_filter("report.pdf"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.source, "report.pdf_chunk_2");
    }

    #[test]
    fn test_empty_filtered_set_returns_empty() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(DisabledProvider));
        store.add(NewEntry::new("Our pricing is $10", "notes")).unwrap();

        // The filter excludes everything; no fall-through to an unfiltered
        // search even though the keyword would match.
        let hits = store.recall(&RecallQuery::new("pricing").with_source_filter("Drive_"));
        assert!(hits.is_empty());
    }

    #[test]
    fn test_empty_filter_strings_mean_no_filter() {
        let query = RecallQuery::new("q").with_category("").with_source_filter("");
        assert!(query.category.is_none());
        assert!(query.source_filter.is_none());
    }

    #[test]
    fn test_empty_query_fallback_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(DisabledProvider));
        store.add(NewEntry::new("some content", "notes")).unwrap();

        assert!(store.recall(&RecallQuery::new("")).is_empty());
    }

    #[test]
    fn test_top_k_larger_than_result_count() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(TopicProvider));
        seed_scenario(&store);

        let hits = store.recall(&RecallQuery::new("product pricing").with_top_k(50));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_recall_on_empty_store() {
        let dir = TempDir::new().unwrap();
        let store = open_with(&dir, Arc::new(TopicProvider));
        assert!(store.recall(&RecallQuery::new("anything")).is_empty());
    }
}
