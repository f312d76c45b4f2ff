//! Hashing-trick embeddings for low-resource scripts.
//!
//! Token uni- and bigrams are hashed into a fixed number of buckets with a
//! sign bit taken from the hash, then L2-normalized. Deterministic, pure,
//! and dependency-free beyond the hash function, so Ge'ez text gets usable
//! vectors even when no sentence encoder covers it.

use std::hash::Hasher;

use sened_core::script::normalize;
use sened_core::token::tokenize;
use sened_core::traits::Embedder;
use sened_core::types::Language;
use twox_hash::XxHash64;

const UNIGRAM_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    /// Matches the sentence-encoder dimension this pipeline assumes, so
    /// hash and encoder vectors land in the same index.
    pub const DEFAULT_DIM: usize = 384;

    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    fn bucket(&self, gram: &str) -> (usize, f32) {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(gram.as_bytes());
        let h = hasher.finish();
        let idx = (h % self.dim as u64) as usize;
        let sign = if h & (1 << 63) == 0 { 1.0 } else { -1.0 };
        (idx, sign)
    }

    fn accumulate(&self, v: &mut [f32], gram: &str, weight: f32) {
        let (idx, sign) = self.bucket(gram);
        v[idx] += sign * weight;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIM)
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    /// Empty or token-free text maps to the zero vector ("no signal");
    /// everything else is unit-norm.
    fn embed(&self, text: &str, language: Language) -> anyhow::Result<Vec<f32>> {
        let normalized = normalize(text);
        let tokens: Vec<String> = tokenize(&normalized, language).collect();
        let mut v = vec![0.0f32; self.dim];
        if tokens.is_empty() {
            return Ok(v);
        }

        for token in &tokens {
            self.accumulate(&mut v, token, UNIGRAM_WEIGHT);
        }
        for pair in tokens.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.accumulate(&mut v, &bigram, BIGRAM_WEIGHT);
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }
}
