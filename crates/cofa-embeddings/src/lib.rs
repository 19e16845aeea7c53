//! Embedding support for the Cofa knowledge store.
//!
//! This crate provides the [`EmbeddingProvider`] trait and the math used to
//! rank stored knowledge by semantic relevance. The embedding model is a
//! heavyweight, optional dependency: a host may run without one, in which
//! case the knowledge store degrades to keyword matching. Every call site
//! therefore branches on [`EmbeddingProvider::is_available`] instead of
//! assuming a model exists, and [`EmbeddingProvider::embed`] reports failure
//! as `None` rather than an error.
//!
//! # Implementations
//!
//! - [`DisabledProvider`]: null object for hosts with no model
//! - [`MockProvider`]: deterministic embeddings for testing
//! - `LocalProvider`: ONNX Runtime inference (requires the `local-embeddings`
//!   feature)

pub mod error;
#[cfg(feature = "local-embeddings")]
pub mod local;
pub mod provider;
pub mod similarity;

pub use error::{ProviderError, Result};
pub use provider::{
    DEFAULT_DIMENSIONS, DisabledProvider, EmbeddingProvider, MockProvider, SharedProvider,
    default_provider,
};
pub use similarity::cosine_similarity;

#[cfg(feature = "local-embeddings")]
pub use local::LocalProvider;
