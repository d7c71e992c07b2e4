//! Embedder trait and vector math helpers.
//!
//! Concrete backends (the local fastembed model, the hashed
//! bag-of-words fallback) live in the `lectern` application crate; this
//! module defines the contract they implement plus the pure vector
//! helpers shared by the index implementations.

use async_trait::async_trait;

use crate::error::Error;

/// Trait for embedding backends.
///
/// # Contract
///
/// - Blank input (empty or whitespace-only) returns the all-zero vector
///   of [`dims`](Embedder::dims) without consulting the model — the
///   sentinel for "no content", never an error.
/// - Identical non-blank inputs return identical vectors across calls.
/// - A backend that cannot be initialized fails with
///   [`Error::ModelUnavailable`]; implementations must not substitute
///   zero vectors for that case.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;

    /// Embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;

    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, Error>;
}

/// The all-zero sentinel vector for blank input.
pub fn zero_vector(dims: usize) -> Vec<f32> {
    vec![0.0; dims]
}

/// Scale a vector to unit length in place. A zero vector is left
/// unchanged, so dot products against it stay zero.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`, or `0.0` for empty vectors,
/// mismatched lengths, or zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
