//! Domain types shared by the classifier and the search engines.

use serde::{Deserialize, Serialize};

pub type DocumentId = u64;

/// Languages the pipeline distinguishes. Amharic uses the Ge'ez script;
/// Afaan Oromo and English are Latin-script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(rename = "am")]
    Amharic,
    #[serde(rename = "om")]
    Oromo,
    #[serde(rename = "en")]
    English,
    Unknown,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Amharic => "am",
            Language::Oromo => "om",
            Language::English => "en",
            Language::Unknown => "unknown",
        }
    }

    pub fn from_code(code: &str) -> Language {
        match code {
            "am" => Language::Amharic,
            "om" => Language::Oromo,
            "en" => Language::English,
            _ => Language::Unknown,
        }
    }

    /// Whether text in this language is written in the Ge'ez script.
    pub fn is_geez_script(self) -> bool {
        matches!(self, Language::Amharic)
    }
}

/// Closed category set. Configuration supplies keywords per category, never
/// new categories, so arbiter comparisons stay checkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Demographics,
    Housing,
    IdRegistry,
    LandPlans,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Demographics,
        Category::Housing,
        Category::IdRegistry,
        Category::LandPlans,
        Category::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Demographics => "demographics",
            Category::Housing => "housing",
            Category::IdRegistry => "id_registry",
            Category::LandPlans => "land_plans",
            Category::Other => "other",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.name() == name)
    }
}

/// Lifecycle of a document moving through ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// A document handed to the indexing layer. The collaborator layer owns
/// extraction and persistence; this is the projection both indices consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexableDocument {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub language: Language,
    /// Creation time as unix seconds; recency tie-breaks use it.
    pub created_ts: i64,
    /// Fixed-dimension embedding; empty means "embed on index".
    pub embedding: Vec<f32>,
}

/// The minimal surface returned by the vector engine. `score` is already
/// normalized to [0,1]; higher is better.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocumentId,
    pub score: f32,
}

/// Which fields of a document contributed to a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    Title,
    Content,
    Tags,
    Semantic,
}

/// A keyword-index hit, carrying the stored metadata fusion needs for
/// filtering and tie-breaking.
#[derive(Debug, Clone)]
pub struct KeywordHit {
    pub id: DocumentId,
    pub score: f32,
    pub matched_fields: Vec<MatchedField>,
    pub category: Category,
    pub created_ts: i64,
}

/// Stored projection of an indexed document, recoverable by id.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub category: Category,
    pub created_ts: i64,
}

/// A fused search result returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document_id: DocumentId,
    /// Relevance in [0,1], comparable across keyword and semantic paths.
    pub score: f32,
    pub matched_fields: Vec<MatchedField>,
    pub snippet: Option<String>,
    pub category: Category,
    pub created_ts: i64,
}

/// Outcome of classification: category plus calibrated confidence and the
/// rule keywords that matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub confidence: f32,
    pub matched_tags: Vec<String>,
    pub language: Language,
}
