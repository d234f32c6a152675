//! Deterministic lexical embedding via feature hashing.
//!
//! Not a neural model: each lowercase alphanumeric token is hashed (blake3)
//! into one of `dim` buckets with a ±1 sign, and the result is L2-normalized.
//! Texts sharing vocabulary land close together, which is enough to exercise
//! the pipeline offline and to give tests a stable provider.

use super::{EmbeddingProvider, ProviderError};
use blake3::Hasher;

/// Default dimension, matching all-MiniLM-L6-v2.
pub const DEFAULT_DIM: usize = 384;

/// Feature-hashing embedder.
#[derive(Debug, Clone)]
pub struct LexicalEmbedder {
    dim: usize,
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self { dim: DEFAULT_DIM }
    }
}

impl LexicalEmbedder {
    /// Create an embedder with the default dimension.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set output dimension. Zero is bumped to one.
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim.max(1);
        self
    }

    fn bucket(&self, token: &str) -> (usize, f32) {
        let mut h = Hasher::new();
        h.update(token.as_bytes());
        let hash = h.finalize();
        let bytes = hash.as_bytes();

        let mut word = [0u8; 8];
        word.copy_from_slice(&bytes[..8]);
        let idx = (u64::from_le_bytes(word) % self.dim as u64) as usize;
        let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
        (idx, sign)
    }
}

impl EmbeddingProvider for LexicalEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let mut v = vec![0.0f32; self.dim];

        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let (idx, sign) = self.bucket(token);
            v[idx] += sign;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(v)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn model_name(&self) -> &str {
        "lexical-hash"
    }
}
