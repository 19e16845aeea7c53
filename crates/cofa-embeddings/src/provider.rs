//! The embedding provider trait and its model-free implementations.

use std::sync::Arc;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Default embedding dimensions (all-MiniLM-L6-v2 produces 384-dim vectors).
pub const DEFAULT_DIMENSIONS: usize = 384;

// ─────────────────────────────────────────────────────────────────────────────
// Provider Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for generating text embeddings.
///
/// Providers convert text into dense vector representations that capture
/// semantic meaning. A provider may be permanently unavailable (no model on
/// the host) or fail transiently; both are reported through the same soft
/// surface so callers can always fall back to lexical matching.
pub trait EmbeddingProvider: Send + Sync {
    /// Whether the underlying model initialized successfully.
    fn is_available(&self) -> bool;

    /// Generate an embedding for a single text.
    ///
    /// Returns `None` when the provider is unavailable or the underlying
    /// model call fails. Callers must treat `None` as "no embedding", never
    /// as a fatal condition.
    fn embed(&self, text: &str) -> Option<Vec<f32>>;

    /// Get the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Get the name of this provider.
    fn name(&self) -> &str;
}

/// A shared provider handle that can be passed to every consumer.
pub type SharedProvider = Arc<dyn EmbeddingProvider>;

// ─────────────────────────────────────────────────────────────────────────────
// Disabled Provider
// ─────────────────────────────────────────────────────────────────────────────

/// Null-object provider for hosts without an embedding model.
///
/// Always reports unavailable and never produces a vector, so downstream
/// search runs its keyword fallback unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledProvider;

impl EmbeddingProvider for DisabledProvider {
    fn is_available(&self) -> bool {
        false
    }

    fn embed(&self, _text: &str) -> Option<Vec<f32>> {
        None
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Provider
// ─────────────────────────────────────────────────────────────────────────────

/// A mock provider for testing purposes.
///
/// Generates deterministic embeddings based on text content, useful for
/// exercising similarity search and persistence without a real model.
#[derive(Debug, Clone)]
pub struct MockProvider {
    dimensions: usize,
}

impl MockProvider {
    /// Create a new mock provider with the specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl EmbeddingProvider for MockProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        // Seed a small PRNG from the text so the same text always produces
        // the same embedding.
        let mut state = simple_hash(text);
        let mut embedding = vec![0.0f32; self.dimensions];
        for value in &mut embedding {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            *value = ((state >> 16) as f32 / 32768.0) - 1.0;
        }

        // Normalize to unit length
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }

        Some(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Simple hash function for deterministic embedding generation.
fn simple_hash(s: &str) -> u64 {
    let mut hash: u64 = 5381;
    for byte in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(byte as u64);
    }
    hash
}

// ─────────────────────────────────────────────────────────────────────────────
// Startup Factory
// ─────────────────────────────────────────────────────────────────────────────

/// Build the provider to use for this process.
///
/// With the `local-embeddings` feature enabled, loads the local ONNX model
/// from its default location when the files exist. In every other case the
/// degradation to [`DisabledProvider`] is decided once, here, at startup;
/// nothing downstream probes for a model at call time.
pub fn default_provider(dimensions: usize) -> SharedProvider {
    #[cfg(feature = "local-embeddings")]
    {
        if let Some(dir) = crate::local::default_model_dir() {
            let model_path = dir.join("model.onnx");
            let tokenizer_path = dir.join("tokenizer.json");
            if model_path.exists() && tokenizer_path.exists() {
                match crate::local::LocalProvider::load(&model_path, &tokenizer_path, dimensions) {
                    Ok(provider) => return Arc::new(provider),
                    Err(e) => {
                        tracing::warn!("Failed to load local embedding model: {}", e);
                    }
                }
            } else {
                tracing::warn!(
                    "Local embedding model not found in {}. Knowledge search will use keyword matching only.",
                    dir.display()
                );
            }
        }
    }
    #[cfg(not(feature = "local-embeddings"))]
    {
        let _ = dimensions;
        tracing::warn!(
            "Built without the 'local-embeddings' feature. Knowledge search will use keyword matching only."
        );
    }
    Arc::new(DisabledProvider)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
