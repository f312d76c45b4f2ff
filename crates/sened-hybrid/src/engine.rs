use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use tracing::{debug, warn};

use sened_core::config::Thresholds;
use sened_core::error::Error;
use sened_core::lang::detect_language;
use sened_core::traits::{Embedder, TextIndexer, VectorIndexer};
use sened_core::types::{
    Category, DocumentId, IndexableDocument, MatchedField, SearchResult, StoredDocument,
};

use crate::snippet::create_snippet;

const SNIPPET_LENGTH: usize = 200;

/// Search mode flags and filters. Filters apply after fusion so both the
/// keyword and the semantic path see the same candidate pool.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub use_semantic: bool,
    /// Overrides the configured similarity threshold when set.
    pub similarity_threshold: Option<f32>,
    pub category: Option<Category>,
    pub tags: Vec<String>,
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            use_semantic: true,
            similarity_threshold: None,
            category: None,
            tags: Vec::new(),
            limit: 10,
        }
    }
}

/// Dual-index engine: every document lives in the keyword index, and in
/// the vector index when its embedding carries signal. The keyword index
/// is the authoritative store for document metadata.
pub struct DocumentEngine<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    text: TI,
    vector: RwLock<VI>,
    embedder: Box<dyn Embedder>,
    thresholds: Thresholds,
}

struct Candidate {
    score: f32,
    matched_fields: Vec<MatchedField>,
    keyword_hit: bool,
    vector_hit: bool,
}

impl<TI, VI> DocumentEngine<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    pub fn new(text: TI, vector: VI, embedder: Box<dyn Embedder>, thresholds: Thresholds) -> Self {
        Self {
            text,
            vector: RwLock::new(vector),
            embedder,
            thresholds,
        }
    }

    pub fn text_index(&self) -> &TI {
        &self.text
    }

    fn embed_document(&self, doc: &IndexableDocument) -> Result<Vec<f32>> {
        if !doc.embedding.is_empty() {
            return Ok(doc.embedding.clone());
        }
        let text = format!("{} {}", doc.title, doc.content);
        self.embedder.embed(&text, doc.language)
    }

    /// Index or re-index one document in both indices. Idempotent per id.
    pub fn index_document(&self, doc: &IndexableDocument) -> Result<()> {
        let embedding = self.embed_document(doc)?;
        self.text.upsert(doc)?;
        let mut vector = self
            .vector
            .write()
            .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;
        vector.upsert(doc.id, embedding)?;
        Ok(())
    }

    pub fn remove_document(&self, id: DocumentId) -> Result<()> {
        self.text.remove(id)?;
        let mut vector = self
            .vector
            .write()
            .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;
        vector.remove(id);
        Ok(())
    }

    /// Fused search across both indices. An empty query returns the most
    /// recent documents instead of an empty page.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        if options.limit == 0 {
            return Ok(Vec::new());
        }
        if query.trim().is_empty() {
            return self.recent_results(options);
        }

        let (language, _) = detect_language(query);
        let mut candidates: HashMap<DocumentId, Candidate> = HashMap::new();

        // Post-merge filters can discard candidates, so both paths fetch
        // past the page size to keep filtered pages filled.
        let fetch = options.limit.saturating_mul(4);
        for hit in self.text.search(query, language, fetch)? {
            candidates.insert(
                hit.id,
                Candidate {
                    score: hit.score,
                    matched_fields: hit.matched_fields,
                    keyword_hit: true,
                    vector_hit: false,
                },
            );
        }

        if options.use_semantic {
            let threshold = options
                .similarity_threshold
                .unwrap_or(self.thresholds.similarity_threshold);
            let query_vec = self.embedder.embed(query, language)?;
            if query_vec.iter().any(|x| *x != 0.0) {
                let vector = self
                    .vector
                    .read()
                    .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;
                for hit in vector.search_vec(&query_vec, fetch) {
                    if hit.score < threshold {
                        continue;
                    }
                    candidates
                        .entry(hit.id)
                        .and_modify(|c| {
                            c.score = c.score.max(hit.score);
                            c.vector_hit = true;
                        })
                        .or_insert(Candidate {
                            score: hit.score,
                            matched_fields: vec![MatchedField::Semantic],
                            keyword_hit: false,
                            vector_hit: true,
                        });
                }
            }
        }

        let mut results = Vec::new();
        for (id, mut candidate) in candidates {
            // Convergent evidence from both paths earns a small bonus; it
            // must never outrank a decisively better single-path score.
            if candidate.keyword_hit && candidate.vector_hit {
                candidate.score =
                    (candidate.score + self.thresholds.dual_match_bonus).min(1.0);
            }
            let Some(stored) = self.text.get(id)? else {
                warn!(id, "document in vector index has no keyword entry");
                continue;
            };
            if !passes_filters(&stored, options) {
                continue;
            }
            results.push(SearchResult {
                document_id: id,
                score: candidate.score.clamp(0.0, 1.0),
                matched_fields: candidate.matched_fields,
                snippet: Some(create_snippet(&stored.content, query, SNIPPET_LENGTH)),
                category: stored.category,
                created_ts: stored.created_ts,
            });
        }

        // Equal scores rank literal matches above semantic-only hits, and
        // only then fall back to recency.
        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| has_literal_match(b).cmp(&has_literal_match(a)))
                .then(b.created_ts.cmp(&a.created_ts))
        });
        results.truncate(options.limit);
        Ok(results)
    }

    fn recent_results(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        // Over-fetch before filtering so a category filter still fills
        // the page when enough documents exist.
        let fetch = options.limit.saturating_mul(4);
        let mut results = Vec::new();
        for stored in self.text.recent(fetch)? {
            if !passes_filters(&stored, options) {
                continue;
            }
            results.push(SearchResult {
                document_id: stored.id,
                score: 0.0,
                matched_fields: Vec::new(),
                snippet: Some(create_snippet(&stored.content, "", SNIPPET_LENGTH)),
                category: stored.category,
                created_ts: stored.created_ts,
            });
            if results.len() == options.limit {
                break;
            }
        }
        Ok(results)
    }

    /// Fill the vector index from documents already in the keyword index.
    /// The vector side lives in memory and starts empty each process; the
    /// keyword index is the durable source to restore it from.
    pub fn hydrate_vectors(&self, max_docs: usize) -> Result<usize> {
        let mut vector = self
            .vector
            .write()
            .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;
        let mut count = 0;
        for stored in self.text.recent(max_docs)? {
            let text = format!("{} {}", stored.title, stored.content);
            let language = detect_language(&text).0;
            let embedding = self.embedder.embed(&text, language)?;
            vector.upsert(stored.id, embedding)?;
            count += 1;
        }
        debug!(documents = count, "hydrated vector index from keyword store");
        Ok(count)
    }

    /// Check that every id in `expected` is present in the keyword index,
    /// and in the vector index whenever its text embeds to a non-zero
    /// vector. The caller supplies the authoritative id list.
    pub fn verify(&self, expected: &[DocumentId]) -> Result<(), Error> {
        let vector = self
            .vector
            .read()
            .map_err(|_| Error::Operation("vector index lock poisoned".to_string()))?;
        for &id in expected {
            let stored = self
                .text
                .get(id)
                .map_err(|e| Error::Operation(e.to_string()))?;
            let Some(stored) = stored else {
                return Err(Error::IndexInconsistency(format!(
                    "document {id} missing from keyword index"
                )));
            };
            let text = format!("{} {}", stored.title, stored.content);
            let language = detect_language(&text).0;
            let embedding = self
                .embedder
                .embed(&text, language)
                .map_err(|e| Error::Operation(e.to_string()))?;
            let has_signal = embedding.iter().any(|x| *x != 0.0);
            if has_signal && !vector.contains(id) {
                return Err(Error::IndexInconsistency(format!(
                    "document {id} missing from vector index"
                )));
            }
        }
        Ok(())
    }

    /// Wipe both indices and re-index from scratch. This is the repair
    /// path for any inconsistency `verify` reports.
    pub fn rebuild(&self, docs: &[IndexableDocument]) -> Result<()> {
        self.text.clear()?;
        {
            let mut vector = self
                .vector
                .write()
                .map_err(|_| anyhow::anyhow!("vector index lock poisoned"))?;
            vector.clear();
        }
        for doc in docs {
            self.index_document(doc)?;
        }
        debug!(documents = docs.len(), "rebuilt both indices");
        Ok(())
    }
}

fn has_literal_match(result: &SearchResult) -> bool {
    result
        .matched_fields
        .iter()
        .any(|f| !matches!(f, MatchedField::Semantic))
}

fn passes_filters(stored: &StoredDocument, options: &SearchOptions) -> bool {
    if let Some(category) = options.category {
        if stored.category != category {
            return false;
        }
    }
    if !options.tags.is_empty() {
        let wanted = options
            .tags
            .iter()
            .any(|t| stored.tags.iter().any(|s| s.eq_ignore_ascii_case(t)));
        if !wanted {
            return false;
        }
    }
    true
}
