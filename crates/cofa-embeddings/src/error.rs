//! Error types for the embeddings crate.

use thiserror::Error;

/// Errors that can occur while loading an embedding model.
///
/// These only surface from explicit model construction (e.g.
/// `LocalProvider::load`). Once a provider is built, inference failures are
/// soft: `embed` logs and returns `None`.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The model file could not be loaded.
    #[error("Model error: {0}")]
    Model(String),

    /// The tokenizer file could not be loaded.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Inference failed inside the runtime.
    #[error("Inference error: {0}")]
    Inference(String),
}

/// Result type alias for provider construction.
pub type Result<T> = std::result::Result<T, ProviderError>;
