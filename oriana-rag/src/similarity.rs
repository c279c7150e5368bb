//! Vector similarity scoring.

/// Compute cosine similarity between two vectors: `dot(a, b) / (|a| * |b|)`.
///
/// Returns `0.0` when either vector has zero magnitude or the result is not
/// finite, so degenerate embeddings rank as unrelated instead of poisoning
/// the sort with NaN.
///
/// # Panics
///
/// Panics if `a` and `b` have different lengths. Mixed dimensionality means
/// vectors from different embedding models were compared.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "cosine_similarity requires vectors of equal length");

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a * norm_b);
    if score.is_finite() { score } else { 0.0 }
}
