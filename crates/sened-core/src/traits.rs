use crate::types::{DocumentId, IndexableDocument, KeywordHit, Language, SearchHit, StoredDocument};

/// Maps text to a fixed-dimension vector. Implementations must agree on a
/// norm convention (unit vectors, or the zero vector for empty input) so
/// the vector index can compare distances across providers.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str, language: Language) -> anyhow::Result<Vec<f32>>;
}

/// Inverted keyword index over document text. Upserts are idempotent per
/// document id; a removed id never comes back from `search`.
pub trait TextIndexer: Send + Sync {
    fn upsert(&self, doc: &IndexableDocument) -> anyhow::Result<()>;
    fn remove(&self, id: DocumentId) -> anyhow::Result<()>;
    fn search(&self, query: &str, language: Language, k: usize) -> anyhow::Result<Vec<KeywordHit>>;
    fn get(&self, id: DocumentId) -> anyhow::Result<Option<StoredDocument>>;
    fn contains(&self, id: DocumentId) -> anyhow::Result<bool>;
    /// Most recently created documents, for empty-query fallbacks.
    fn recent(&self, k: usize) -> anyhow::Result<Vec<StoredDocument>>;
    /// Drop every posting; used by full rebuilds.
    fn clear(&self) -> anyhow::Result<()>;
}

/// Nearest-neighbor store over document embeddings. Zero vectors carry no
/// signal and are never indexed or returned.
pub trait VectorIndexer: Send + Sync {
    fn upsert(&mut self, id: DocumentId, embedding: Vec<f32>) -> anyhow::Result<()>;
    fn remove(&mut self, id: DocumentId);
    fn contains(&self, id: DocumentId) -> bool;
    fn search_vec(&self, query: &[f32], k: usize) -> Vec<SearchHit>;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
