use sened_core::traits::TextIndexer;
use sened_core::types::{Category, IndexableDocument, Language, MatchedField};
use sened_text::KeywordIndex;

fn doc(id: u64, title: &str, content: &str, tags: &[&str], created_ts: i64) -> IndexableDocument {
    IndexableDocument {
        id,
        title: title.to_string(),
        content: content.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        category: Category::Housing,
        language: Language::English,
        created_ts,
        embedding: Vec::new(),
    }
}

fn index(dir: &tempfile::TempDir) -> KeywordIndex {
    KeywordIndex::open(dir.path().join("idx")).unwrap()
}

#[test]
fn indexed_document_is_searchable() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    idx.upsert(&doc(1, "Lease agreement", "Tenant rents the property", &["lease"], 10))
        .unwrap();
    let hits = idx.search("lease", Language::English, 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 1);
    assert!(hits[0].matched_fields.contains(&MatchedField::Title));
    assert!(hits[0].matched_fields.contains(&MatchedField::Tags));
}

#[test]
fn upsert_is_idempotent_per_id() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    idx.upsert(&doc(7, "Old title", "first version", &[], 1)).unwrap();
    idx.upsert(&doc(7, "New title", "second version lease", &[], 2)).unwrap();
    let hits = idx.search("lease", Language::English, 10).unwrap();
    assert_eq!(hits.len(), 1);
    let stored = idx.get(7).unwrap().unwrap();
    assert_eq!(stored.title, "New title");
    assert_eq!(stored.created_ts, 2);
}

#[test]
fn removed_document_never_returns() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    idx.upsert(&doc(3, "Survey plan", "land deed boundary", &[], 5)).unwrap();
    assert!(idx.contains(3).unwrap());
    idx.remove(3).unwrap();
    assert!(!idx.contains(3).unwrap());
    assert!(idx.search("deed", Language::English, 5).unwrap().is_empty());
    assert!(idx.get(3).unwrap().is_none());
}

#[test]
fn amharic_text_matches_amharic_query() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    let mut d = doc(11, "የመሬት ካርታ", "የመሬት ካርታ ሰነድ።", &[], 1);
    d.language = Language::Amharic;
    d.category = Category::LandPlans;
    idx.upsert(&d).unwrap();
    let hits = idx.search("ካርታ", Language::Amharic, 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 11);
    assert_eq!(hits[0].category, Category::LandPlans);
}

#[test]
fn scores_are_normalized_to_unit_interval() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    idx.upsert(&doc(1, "lease lease lease", "lease rent lease", &[], 1)).unwrap();
    idx.upsert(&doc(2, "unrelated", "one lease mention", &[], 2)).unwrap();
    let hits = idx.search("lease", Language::English, 5).unwrap();
    assert_eq!(hits.len(), 2);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    assert!(hits.iter().all(|h| h.score > 0.0 && h.score <= 1.0));
    assert!(hits[0].score >= hits[1].score);
}

#[test]
fn equal_scores_break_ties_by_recency() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    idx.upsert(&doc(1, "permit", "stamped permit", &[], 100)).unwrap();
    idx.upsert(&doc(2, "permit", "stamped permit", &[], 200)).unwrap();
    let hits = idx.search("permit", Language::English, 5).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, 2);
}

#[test]
fn recent_orders_by_created_ts_descending() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    idx.upsert(&doc(1, "a", "first", &[], 10)).unwrap();
    idx.upsert(&doc(2, "b", "second", &[], 30)).unwrap();
    idx.upsert(&doc(3, "c", "third", &[], 20)).unwrap();
    let recent = idx.recent(2).unwrap();
    let ids: Vec<u64> = recent.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[test]
fn empty_query_returns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    idx.upsert(&doc(1, "anything", "anything at all", &[], 1)).unwrap();
    assert!(idx.search("", Language::English, 5).unwrap().is_empty());
    // Stop words alone carry no searchable tokens.
    assert!(idx.search("the of and", Language::English, 5).unwrap().is_empty());
}

#[test]
fn clear_drops_all_postings() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    idx.upsert(&doc(1, "a", "lease", &[], 1)).unwrap();
    idx.upsert(&doc(2, "b", "lease", &[], 2)).unwrap();
    idx.clear().unwrap();
    assert!(idx.search("lease", Language::English, 5).unwrap().is_empty());
    assert!(idx.recent(5).unwrap().is_empty());
}

#[test]
fn stored_document_round_trips_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&dir);
    let mut d = doc(42, "Title", "Content body", &["one", "two"], 99);
    d.category = Category::IdRegistry;
    idx.upsert(&d).unwrap();
    let stored = idx.get(42).unwrap().unwrap();
    assert_eq!(stored.tags, vec!["one", "two"]);
    assert_eq!(stored.category, Category::IdRegistry);
    assert_eq!(stored.created_ts, 99);
}
