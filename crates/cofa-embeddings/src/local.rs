//! Local sentence embeddings using ONNX Runtime.
//!
//! This module requires the `local-embeddings` feature. It runs a sentence
//! transformer (e.g. all-MiniLM-L6-v2 exported to ONNX) fully offline:
//! tokenize, run the encoder, mean-pool over the attention mask, L2
//! normalize.
//!
//! Inference is synchronous and may be slow on the first call while the
//! runtime warms up; callers ingesting many chunks in a loop should expect
//! latency proportional to call count.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use ort::{GraphOptimizationLevel, Session};
use tokenizers::Tokenizer;
use tracing::warn;

use crate::error::{ProviderError, Result};
use crate::provider::EmbeddingProvider;

/// Default directory for local embedding model files.
///
/// `default_provider` looks for `model.onnx` and `tokenizer.json` here.
pub fn default_model_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("cofa").join("models").join("embeddings"))
}

/// Embedding provider backed by a local ONNX model.
pub struct LocalProvider {
    session: Session,
    tokenizer: Tokenizer,
    dimensions: usize,
}

impl LocalProvider {
    /// Load a local provider from model files.
    ///
    /// # Arguments
    /// * `model_path` - Path to the ONNX model file
    /// * `tokenizer_path` - Path to the tokenizer.json file
    /// * `dimensions` - Output embedding dimensions
    pub fn load(
        model_path: impl AsRef<Path>,
        tokenizer_path: impl AsRef<Path>,
        dimensions: usize,
    ) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| ProviderError::Model(format!("Failed to create ONNX session: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ProviderError::Model(format!("Failed to set optimization level: {}", e)))?
            .commit_from_file(model_path.as_ref())
            .map_err(|e| {
                ProviderError::Model(format!(
                    "Failed to load ONNX model from {:?}: {}",
                    model_path.as_ref(),
                    e
                ))
            })?;

        let tokenizer = Tokenizer::from_file(tokenizer_path.as_ref()).map_err(|e| {
            ProviderError::Tokenizer(format!(
                "Failed to load tokenizer from {:?}: {}",
                tokenizer_path.as_ref(),
                e
            ))
        })?;

        Ok(Self {
            session,
            tokenizer,
            dimensions,
        })
    }

    /// Run inference for a single text.
    fn infer(&self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ProviderError::Inference(format!("Tokenization failed: {}", e)))?;

        let seq_len = encoding.get_ids().len();
        let to_i64 = |xs: &[u32]| xs.iter().map(|&v| v as i64).collect::<Vec<i64>>();

        let input_ids = Array2::from_shape_vec((1, seq_len), to_i64(encoding.get_ids()))
            .map_err(|e| ProviderError::Inference(format!("Array error: {}", e)))?;
        let attention_mask =
            Array2::from_shape_vec((1, seq_len), to_i64(encoding.get_attention_mask()))
                .map_err(|e| ProviderError::Inference(format!("Array error: {}", e)))?;
        let token_type_ids = Array2::from_shape_vec((1, seq_len), to_i64(encoding.get_type_ids()))
            .map_err(|e| ProviderError::Inference(format!("Array error: {}", e)))?;

        let outputs = self
            .session
            .run(
                ort::inputs![
                    "input_ids" => input_ids.view(),
                    "attention_mask" => attention_mask.view(),
                    "token_type_ids" => token_type_ids.view(),
                ]
                .map_err(|e| ProviderError::Inference(format!("Input error: {}", e)))?,
            )
            .map_err(|e| ProviderError::Inference(format!("ONNX inference failed: {}", e)))?;

        // Output shape is (1, seq_len, hidden_dim); mean-pool the token
        // vectors where the attention mask is set, then L2 normalize.
        let hidden = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ProviderError::Inference(format!("Output extraction failed: {}", e)))?;
        let hidden = hidden.view();
        let hidden_dim = hidden.shape()[2];

        let mask = encoding.get_attention_mask();
        let mut pooled = vec![0.0f32; hidden_dim];
        let mut count = 0.0f32;
        for (j, &mask_val) in mask.iter().enumerate() {
            if mask_val > 0 {
                for k in 0..hidden_dim {
                    pooled[k] += hidden[[0, j, k]];
                }
                count += 1.0;
            }
        }
        if count > 0.0 {
            for v in &mut pooled {
                *v /= count;
            }
        }

        let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-9 {
            for v in &mut pooled {
                *v /= norm;
            }
        }

        Ok(pooled)
    }
}

impl EmbeddingProvider for LocalProvider {
    fn is_available(&self) -> bool {
        true
    }

    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        match self.infer(text) {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                warn!("Embedding failed: {}", e);
                None
            }
        }
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "local"
    }
}
