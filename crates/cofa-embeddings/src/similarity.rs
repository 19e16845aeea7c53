//! Vector similarity math.

/// Calculate cosine similarity between two embeddings.
///
/// Returns a value in `[-1.0, 1.0]`. Defined as `0.0` when either vector has
/// zero norm or the lengths differ (a dimension mismatch means the vectors
/// came from different models and cannot be compared).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}
