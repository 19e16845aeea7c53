//! Rendering recall results into a bounded, prompt-ready block.

use crate::store::{KnowledgeStore, RecallQuery};
use crate::types::SearchHit;

/// Maximum characters of entry content included per result.
pub const MAX_SNIPPET_CHARS: usize = 800;

/// Results a source-filtered block recalls before formatting.
const SOURCE_FILTERED_TOP_K: usize = 15;
/// Results a general block recalls before formatting.
const GENERAL_TOP_K: usize = 8;

/// Render recall results for inclusion in a downstream prompt.
///
/// Each result gets a `[CATEGORY] Source: <source>` header and its content,
/// truncated to [`MAX_SNIPPET_CHARS`] with an ellipsis marker. The block ends
/// with an instruction telling the consumer to use only the included
/// knowledge and to state unavailability instead of fabricating an answer;
/// the wording is stricter when a source filter restricted the results.
///
/// Empty `hits` produce an empty string, no headers.
pub fn format_knowledge(hits: &[SearchHit], source_filter_active: bool) -> String {
    if hits.is_empty() {
        return String::new();
    }

    let mut out = String::from("=== RELEVANT DOCUMENT KNOWLEDGE ===\n\n");
    for hit in hits {
        let entry = &hit.entry;
        out.push_str(&format!(
            "[{}] Source: {}\n",
            entry.category.to_uppercase(),
            entry.source
        ));
        if entry.content.chars().count() > MAX_SNIPPET_CHARS {
            out.extend(entry.content.chars().take(MAX_SNIPPET_CHARS));
            out.push_str("...\n\n");
        } else {
            out.push_str(&entry.content);
            out.push_str("\n\n");
        }
    }
    out.push_str("=== END OF DOCUMENT KNOWLEDGE ===\n\n");

    if source_filter_active {
        out.push_str(
            "IMPORTANT: Use ONLY the information from the files above to answer the user's \
             question. Do not reference any other uploaded files or documents. If the files \
             contain the answer, use it. If not, state that the information is not available \
             in those files.\n\n",
        );
    } else {
        out.push_str(
            "IMPORTANT: Use ONLY the information from the document knowledge above to answer \
             the user's question. Do not make up information. If the document knowledge \
             contains the answer, use it. If not, state that the information is not available \
             in the uploaded documents.\n\n",
        );
    }

    out
}

impl KnowledgeStore {
    /// Recall and format in one step, for prompt construction.
    ///
    /// Recalls more results when a source filter is active (filtered queries
    /// tend to span many chunks of the same document), then renders them via
    /// [`format_knowledge`]. Returns an empty string when nothing matched;
    /// the consumer should then say no relevant information was found.
    pub fn knowledge_block(
        &self,
        query: &str,
        category: Option<&str>,
        source_filter: Option<&str>,
    ) -> String {
        let filter_active = source_filter.is_some_and(|f| !f.is_empty());
        let top_k = if filter_active {
            SOURCE_FILTERED_TOP_K
        } else {
            GENERAL_TOP_K
        };

        let mut recall_query = RecallQuery::new(query).with_top_k(top_k);
        if let Some(category) = category {
            recall_query = recall_query.with_category(category);
        }
        if let Some(filter) = source_filter {
            recall_query = recall_query.with_source_filter(filter);
        }

        format_knowledge(&self.recall(&recall_query), filter_active)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use cofa_embeddings::DisabledProvider;
    use tempfile::TempDir;

    use super::*;
    use crate::store::StoreConfig;
    use crate::types::{KnowledgeEntry, Metadata, NewEntry, entry_id};

    fn hit(content: &str, source: &str, category: &str) -> SearchHit {
        SearchHit {
            entry: KnowledgeEntry {
                id: entry_id(source, content),
                content: content.to_string(),
                source: source.to_string(),
                category: category.to_string(),
                timestamp: Utc::now(),
                metadata: Metadata::new(),
            },
            similarity: 0.9,
        }
    }

    #[test]
    fn test_empty_results_format_to_empty_string() {
        assert_eq!(format_knowledge(&[], false), "");
        assert_eq!(format_knowledge(&[], true), "");
    }

    #[test]
    fn test_format_headers_and_attribution() {
        let hits = vec![hit("Our premium product costs $999", "catalog", "product")];
        let block = format_knowledge(&hits, false);

        assert!(block.starts_with("=== RELEVANT DOCUMENT KNOWLEDGE ===\n\n"));
        assert!(block.contains("[PRODUCT] Source: catalog\n"));
        assert!(block.contains("Our premium product costs $999"));
        assert!(block.contains("=== END OF DOCUMENT KNOWLEDGE ==="));
    }

    #[test]
    fn test_format_truncates_long_content() {
        let long = "a".repeat(2000);
        let hits = vec![hit(&long, "big.pdf", "document")];
        let block = format_knowledge(&hits, false);

        let snippet = "a".repeat(MAX_SNIPPET_CHARS);
        assert!(block.contains(&format!("{}...", snippet)));
        assert!(!block.contains(&"a".repeat(MAX_SNIPPET_CHARS + 1)));
    }

    #[test]
    fn test_format_short_content_not_truncated() {
        let hits = vec![hit("short", "s", "general")];
        let block = format_knowledge(&hits, false);
        assert!(block.contains("short\n\n"));
        assert!(!block.contains("short..."));
    }

    #[test]
    fn test_instruction_wording_depends_on_source_filter() {
        let hits = vec![hit("content", "Drive_1", "document")];

        let filtered = format_knowledge(&hits, true);
        let general = format_knowledge(&hits, false);

        assert!(filtered.contains("not available in those files"));
        assert!(general.contains("Do not make up information"));
        assert_ne!(filtered, general);
    }

    #[test]
    fn test_knowledge_block_empty_store() {
        let dir = TempDir::new().unwrap();
        let store =
            KnowledgeStore::open(StoreConfig::in_dir(dir.path()), Arc::new(DisabledProvider));
        assert_eq!(store.knowledge_block("anything", None, None), "");
    }

    #[test]
    fn test_knowledge_block_recalls_and_formats() {
        let dir = TempDir::new().unwrap();
        let store =
            KnowledgeStore::open(StoreConfig::in_dir(dir.path()), Arc::new(DisabledProvider));
        store
            .add(NewEntry::new("Our pricing is $10", "Drive_20260801").with_category("document"))
            .unwrap();

        let block = store.knowledge_block("pricing", None, Some("Drive_"));
        assert!(block.contains("[DOCUMENT] Source: Drive_20260801"));
        assert!(block.contains("not available in those files"));

        // Entries outside the filter produce nothing.
        assert_eq!(store.knowledge_block("pricing", None, Some("Other_")), "");
    }
}
