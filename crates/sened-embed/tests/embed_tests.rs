use sened_core::traits::Embedder;
use sened_core::types::Language;
use sened_embed::{default_provider, EmbeddingProvider, HashEmbedder};

#[test]
fn hash_embedding_is_deterministic() {
    let e = HashEmbedder::default();
    let a = e.embed("የቦታ ውል ሰነድ", Language::Amharic).unwrap();
    let b = e.embed("የቦታ ውል ሰነድ", Language::Amharic).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), HashEmbedder::DEFAULT_DIM);
}

#[test]
fn hash_embedding_is_unit_norm() {
    let e = HashEmbedder::default();
    let v = e.embed("land survey deed boundary", Language::English).unwrap();
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let e = HashEmbedder::default();
    let v = e.embed("", Language::English).unwrap();
    assert!(v.iter().all(|x| *x == 0.0));
    // Stop-word-only text carries no signal either.
    let v = e.embed("the of and", Language::English).unwrap();
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn different_texts_differ() {
    let e = HashEmbedder::default();
    let a = e.embed("lease agreement tenant", Language::English).unwrap();
    let b = e.embed("land plot boundary", Language::English).unwrap();
    assert_ne!(a, b);
}

#[test]
fn similar_texts_are_closer_than_unrelated() {
    let e = HashEmbedder::default();
    let base = e.embed("house lease rent tenant", Language::English).unwrap();
    let near = e.embed("house lease rent landlord", Language::English).unwrap();
    let far = e.embed("passport registry certificate", Language::English).unwrap();
    let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    assert!(dot(&base, &near) > dot(&base, &far));
}

#[test]
fn default_provider_respects_hash_override() {
    std::env::set_var("APP_USE_HASH_EMBEDDINGS", "1");
    let provider = default_provider(128).unwrap();
    assert!(matches!(provider, EmbeddingProvider::Hash(_)));
    assert_eq!(provider.dim(), 128);
    std::env::remove_var("APP_USE_HASH_EMBEDDINGS");
}
