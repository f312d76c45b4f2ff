//! sened-embed
//!
//! Embedding providers for the document pipeline. Two paths share one
//! `Embedder` contract: an encoder-backed path (candle XLM-R, behind the
//! `encoder` feature) and a hashing-trick fallback that handles Ge'ez
//! script and encoder-less deployments. Both produce unit-norm vectors of
//! the same dimension, or the zero vector for empty text.

pub mod hash;

#[cfg(feature = "encoder")]
pub mod encoder;

pub use hash::HashEmbedder;

use sened_core::traits::Embedder;
use sened_core::types::Language;
use tracing::debug;

/// Capability-polymorphic embedding provider. Routing happens per call:
/// Ge'ez-script languages always take the hash path because the encoder
/// checkpoints lack adequate coverage for them.
pub enum EmbeddingProvider {
    Hash(HashEmbedder),
    #[cfg(feature = "encoder")]
    Encoder {
        encoder: encoder::EncoderEmbedder,
        fallback: HashEmbedder,
    },
}

impl Embedder for EmbeddingProvider {
    fn dim(&self) -> usize {
        match self {
            EmbeddingProvider::Hash(h) => h.dim(),
            #[cfg(feature = "encoder")]
            EmbeddingProvider::Encoder { encoder, .. } => encoder.dim(),
        }
    }

    fn embed(&self, text: &str, language: Language) -> anyhow::Result<Vec<f32>> {
        match self {
            EmbeddingProvider::Hash(h) => h.embed(text, language),
            #[cfg(feature = "encoder")]
            EmbeddingProvider::Encoder { encoder, fallback } => {
                if language.is_geez_script() {
                    debug!(language = language.code(), "routing to hash fallback");
                    return fallback.embed(text, language);
                }
                if text.trim().is_empty() {
                    return Ok(vec![0.0; encoder.dim()]);
                }
                encoder.embed_text(text)
            }
        }
    }
}

/// Pick the best available provider. `APP_USE_HASH_EMBEDDINGS=1` forces the
/// hash path; otherwise the encoder is used when the `encoder` feature is
/// compiled in and model files resolve, and the hash path is the fallback.
pub fn default_provider(dim: usize) -> anyhow::Result<EmbeddingProvider> {
    let force_hash = std::env::var("APP_USE_HASH_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if force_hash {
        debug!("hash embeddings forced via APP_USE_HASH_EMBEDDINGS");
        return Ok(EmbeddingProvider::Hash(HashEmbedder::new(dim)));
    }

    #[cfg(feature = "encoder")]
    {
        if let Some(model_dir) = encoder::resolve_model_dir() {
            let enc = encoder::EncoderEmbedder::load(&model_dir)?;
            let fallback = HashEmbedder::new(enc.dim());
            return Ok(EmbeddingProvider::Encoder { encoder: enc, fallback });
        }
        debug!("no encoder model directory found, using hash embeddings");
    }

    Ok(EmbeddingProvider::Hash(HashEmbedder::new(dim)))
}
