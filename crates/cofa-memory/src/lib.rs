//! Knowledge memory store for the Cofa assistant.
//!
//! This crate provides a persistent, semantically searchable collection of
//! short text fragments (document chunks, conversation turns, sales notes),
//! retrievable by approximate relevance to a free-text query. When no
//! embedding model is present the store degrades to keyword matching instead
//! of failing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  KnowledgeStore                                                         │
//! │  - Append-only entry list, persisted as a JSON array file               │
//! │  - Parallel embedding records with an in-memory id→vector lookup        │
//! │  - Recall: cosine similarity when embeddings exist, keyword fallback    │
//! │  - Formatter: bounded prompt block with source attribution              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use cofa_embeddings::{DEFAULT_DIMENSIONS, default_provider};
//! use cofa_memory::{KnowledgeStore, NewEntry, RecallQuery, StoreConfig};
//!
//! // One store per process, injected into consumers.
//! let provider = default_provider(DEFAULT_DIMENSIONS);
//! let store = KnowledgeStore::open(StoreConfig::default(), provider);
//!
//! // Ingest a chunk of knowledge.
//! let id = store.add(
//!     NewEntry::new("Our premium product costs $999", "catalog").with_category("product"),
//! )?;
//!
//! // Recall by relevance.
//! let hits = store.recall(&RecallQuery::new("product pricing").with_top_k(3));
//! for hit in &hits {
//!     println!("{} ({:.2})", hit.entry.content, hit.similarity);
//! }
//!
//! // Or get a prompt-ready block directly.
//! let block = store.knowledge_block("product pricing", None, None);
//! # let _ = (id, block);
//! # Ok::<(), cofa_memory::MemoryError>(())
//! ```

pub mod error;
pub mod format;
pub mod index;
pub mod store;
pub mod types;

pub use error::{MemoryError, Result};
pub use format::{MAX_SNIPPET_CHARS, format_knowledge};
pub use index::EmbeddingIndex;
pub use store::{
    DEFAULT_TOP_K, KEYWORD_MATCH_SCORE, KnowledgeStore, RecallQuery, StoreConfig,
};
pub use types::{
    DEFAULT_CATEGORY, EmbeddingRecord, KnowledgeEntry, Metadata, NewEntry, PREVIEW_CHARS,
    SearchHit, StoreStats, entry_id,
};
