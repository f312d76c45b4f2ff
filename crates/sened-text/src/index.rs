use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{AllQuery, BooleanQuery, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{Index, TantivyDocument, Term};
use tracing::debug;

use sened_core::script::normalize;
use sened_core::token::tokenize;
use sened_core::traits::TextIndexer;
use sened_core::types::{
    Category, DocumentId, IndexableDocument, KeywordHit, Language, MatchedField, StoredDocument,
};

use crate::schema::{build_schema, register_tokenizer};

const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Inverted index over title, content and tags, backed by tantivy.
pub struct KeywordIndex {
    index: Index,
    id_field: tantivy::schema::Field,
    title_field: tantivy::schema::Field,
    content_field: tantivy::schema::Field,
    tags_field: tantivy::schema::Field,
    category_field: tantivy::schema::Field,
    created_ts_field: tantivy::schema::Field,
}

impl KeywordIndex {
    /// Open an existing index directory or create a fresh one.
    pub fn open(index_dir: impl Into<PathBuf>) -> Result<Self> {
        let index_dir = index_dir.into();
        let index = if index_dir.join("meta.json").exists() {
            Index::open_in_dir(&index_dir)?
        } else {
            std::fs::create_dir_all(&index_dir)?;
            Index::create_in_dir(&index_dir, build_schema())?
        };
        register_tokenizer(&index);
        let schema = index.schema();
        Ok(Self {
            id_field: schema.get_field("id")?,
            title_field: schema.get_field("title")?,
            content_field: schema.get_field("content")?,
            tags_field: schema.get_field("tags")?,
            category_field: schema.get_field("category")?,
            created_ts_field: schema.get_field("created_ts")?,
            index,
        })
    }

    fn stored_document(&self, doc: &TantivyDocument) -> Option<StoredDocument> {
        let id = doc.get_first(self.id_field)?.as_u64()?;
        let title = doc
            .get_first(self.title_field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let content = doc
            .get_first(self.content_field)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let tags = doc
            .get_all(self.tags_field)
            .filter_map(|v| v.as_str())
            .map(str::to_string)
            .collect();
        let category = doc
            .get_first(self.category_field)
            .and_then(|v| v.as_str())
            .and_then(Category::from_name)
            .unwrap_or(Category::Other);
        let created_ts = doc
            .get_first(self.created_ts_field)
            .and_then(|v| v.as_i64())
            .unwrap_or(0);
        Some(StoredDocument {
            id,
            title,
            content,
            tags,
            category,
            created_ts,
        })
    }

    fn fetch_by_id(&self, id: DocumentId) -> Result<Option<TantivyDocument>> {
        let reader = self.index.reader()?;
        let searcher = reader.searcher();
        let q = TermQuery::new(
            Term::from_field_u64(self.id_field, id),
            IndexRecordOption::Basic,
        );
        let top = searcher.search(&q, &TopDocs::with_limit(1))?;
        match top.first() {
            Some((_, addr)) => Ok(Some(searcher.doc(*addr)?)),
            None => Ok(None),
        }
    }

    /// Which fields contain at least one of the query tokens. Attribution
    /// runs over the stored text, so it reflects what the reader will see
    /// in the document, not analyzer internals.
    fn attribute_fields(stored: &StoredDocument, query_tokens: &HashSet<String>) -> Vec<MatchedField> {
        let mut fields = Vec::new();
        let contains_any = |text: &str| {
            tokenize(&normalize(text), Language::Unknown).any(|t| query_tokens.contains(&t))
        };
        if contains_any(&stored.title) {
            fields.push(MatchedField::Title);
        }
        if contains_any(&stored.content) {
            fields.push(MatchedField::Content);
        }
        if stored.tags.iter().any(|t| contains_any(t)) {
            fields.push(MatchedField::Tags);
        }
        if fields.is_empty() {
            fields.push(MatchedField::Content);
        }
        fields
    }
}

impl TextIndexer for KeywordIndex {
    /// Idempotent per id: any previous posting for the id is deleted in
    /// the same commit that adds the new one.
    fn upsert(&self, doc: &IndexableDocument) -> Result<()> {
        let mut writer = self.index.writer(WRITER_HEAP_BYTES)?;
        writer.delete_term(Term::from_field_u64(self.id_field, doc.id));
        let mut tdoc = TantivyDocument::default();
        tdoc.add_u64(self.id_field, doc.id);
        tdoc.add_text(self.title_field, &doc.title);
        tdoc.add_text(self.content_field, &doc.content);
        for tag in &doc.tags {
            tdoc.add_text(self.tags_field, tag);
        }
        tdoc.add_text(self.category_field, doc.category.name());
        tdoc.add_i64(self.created_ts_field, doc.created_ts);
        writer.add_document(tdoc)?;
        writer.commit()?;
        debug!(id = doc.id, "upserted document into keyword index");
        Ok(())
    }

    fn remove(&self, id: DocumentId) -> Result<()> {
        let mut writer: tantivy::IndexWriter = self.index.writer(WRITER_HEAP_BYTES)?;
        writer.delete_term(Term::from_field_u64(self.id_field, id));
        writer.commit()?;
        Ok(())
    }

    fn search(&self, query: &str, language: Language, k: usize) -> Result<Vec<KeywordHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let normalized = normalize(query);
        let tokens: Vec<String> = tokenize(&normalized, language).collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut clauses: Vec<Box<dyn Query>> = Vec::new();
        for token in &tokens {
            for field in [self.title_field, self.content_field, self.tags_field] {
                clauses.push(Box::new(TermQuery::new(
                    Term::from_field_text(field, token),
                    IndexRecordOption::WithFreqs,
                )));
            }
        }
        let query = BooleanQuery::union(clauses);

        let reader = self.index.reader()?;
        let searcher = reader.searcher();
        // Fetch past k so the recency tie-break sees the whole tied band
        // at the page boundary before truncation.
        let top_docs = searcher.search(&query, &TopDocs::with_limit(k * 2))?;
        let max_score = top_docs
            .iter()
            .map(|(s, _)| *s)
            .fold(0.0f32, f32::max)
            .max(f32::EPSILON);

        let token_set: HashSet<String> = tokens.into_iter().collect();
        let mut hits = Vec::new();
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr)?;
            let Some(stored) = self.stored_document(&doc) else {
                continue;
            };
            let matched_fields = Self::attribute_fields(&stored, &token_set);
            hits.push(KeywordHit {
                id: stored.id,
                // BM25 is unbounded; dividing by the batch maximum puts
                // keyword scores on the same [0,1] scale as vector scores.
                score: score / max_score,
                matched_fields,
                category: stored.category,
                created_ts: stored.created_ts,
            });
        }
        hits.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(b.created_ts.cmp(&a.created_ts))
        });
        hits.truncate(k);
        Ok(hits)
    }

    fn get(&self, id: DocumentId) -> Result<Option<StoredDocument>> {
        Ok(self
            .fetch_by_id(id)?
            .as_ref()
            .and_then(|d| self.stored_document(d)))
    }

    fn contains(&self, id: DocumentId) -> Result<bool> {
        let reader = self.index.reader()?;
        let searcher = reader.searcher();
        let q = TermQuery::new(
            Term::from_field_u64(self.id_field, id),
            IndexRecordOption::Basic,
        );
        Ok(searcher.search(&q, &Count)? > 0)
    }

    fn recent(&self, k: usize) -> Result<Vec<StoredDocument>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let reader = self.index.reader()?;
        let searcher = reader.searcher();
        let collector =
            TopDocs::with_limit(k).order_by_fast_field::<i64>("created_ts", tantivy::Order::Desc);
        let top_docs = searcher.search(&AllQuery, &collector)?;
        let mut docs = Vec::new();
        for (_, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr)?;
            if let Some(stored) = self.stored_document(&doc) {
                docs.push(stored);
            }
        }
        Ok(docs)
    }

    fn clear(&self) -> Result<()> {
        let mut writer: tantivy::IndexWriter = self.index.writer(WRITER_HEAP_BYTES)?;
        writer.delete_all_documents()?;
        writer.commit()?;
        Ok(())
    }
}

/// Path helper used by callers that keep the keyword index under a shared
/// data directory.
pub fn default_index_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("keyword-index")
}
