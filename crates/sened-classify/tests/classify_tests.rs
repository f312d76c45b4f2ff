use sened_classify::ClassifierEngine;
use sened_core::config::Thresholds;
use sened_core::types::{Category, Language};

fn engine(dir: &tempfile::TempDir) -> ClassifierEngine {
    ClassifierEngine::with_builtin_rules(dir.path().join("classifier.json"), Thresholds::default())
}

fn training_corpus() -> (Vec<String>, Vec<Category>) {
    let texts = vec![
        "resident name age gender and marital status form".to_string(),
        "census entry listing age gender and birth details".to_string(),
        "lease agreement tenant landlord monthly rent".to_string(),
        "housing contract for rent between tenant and landlord".to_string(),
        "passport application and identification certificate".to_string(),
        "registry certificate for national identification".to_string(),
        "land plot survey deed and boundary plan".to_string(),
        "survey of the land parcel with deed transfer plan".to_string(),
    ];
    let labels = vec![
        Category::Demographics,
        Category::Demographics,
        Category::Housing,
        Category::Housing,
        Category::IdRegistry,
        Category::IdRegistry,
        Category::LandPlans,
        Category::LandPlans,
    ];
    (texts, labels)
}

#[test]
fn empty_text_is_other_with_zero_confidence() {
    let dir = tempfile::tempdir().unwrap();
    let c = engine(&dir).classify("   ", None);
    assert_eq!(c.category, Category::Other);
    assert_eq!(c.confidence, 0.0);
    assert!(c.matched_tags.is_empty());
    assert_eq!(c.language, Language::Unknown);
}

#[test]
fn amharic_housing_text_takes_rule_fast_path() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(&dir);
    e.add_rule_keywords(Language::Amharic, Category::Housing, ["ቦታ"]);
    let c = e.classify("የቦታ ውል ሰነድ", None);
    assert_eq!(c.category, Category::Housing);
    assert!(c.confidence >= 0.8, "confidence {}", c.confidence);
    assert_eq!(c.language, Language::Amharic);
    assert!(c.matched_tags.contains(&"ቦታ".to_string()));
}

#[test]
fn fast_path_is_stable_across_training() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(&dir);
    let before = e.classify("passport identification certificate registry", None);
    assert!(before.confidence >= 0.8);

    let (texts, labels) = training_corpus();
    e.train(&texts, &labels).unwrap();

    let after = e.classify("passport identification certificate registry", None);
    assert_eq!(before.category, after.category);
    assert_eq!(before.confidence, after.confidence);
    assert_eq!(before.matched_tags, after.matched_tags);
}

#[test]
fn model_decides_when_rules_are_weak() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(&dir);
    let (texts, labels) = training_corpus();
    e.train(&texts, &labels).unwrap();
    assert!(e.has_model());

    // No rule keyword matches here; only the model carries signal.
    let c = e.classify("monthly payment due from the occupant to the owner", None);
    assert!(c.confidence > 0.0);
    assert!(c.confidence <= 1.0);
}

#[test]
fn low_confidence_collapses_to_other() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(&dir);
    // Nothing in the rule table matches, and no model is loaded.
    let c = e.classify("completely unrelated gibberish qwertyuiop", None);
    assert_eq!(c.category, Category::Other);
    assert!(c.confidence < 0.3);
}

#[test]
fn classification_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(&dir);
    let (texts, labels) = training_corpus();
    e.train(&texts, &labels).unwrap();
    let a = e.classify("land survey with the boundary deed", None);
    let b = e.classify("land survey with the boundary deed", None);
    assert_eq!(a.category, b.category);
    assert_eq!(a.confidence, b.confidence);
}

#[test]
fn failed_training_keeps_previous_model() {
    let dir = tempfile::tempdir().unwrap();
    let e = engine(&dir);
    let (texts, labels) = training_corpus();
    e.train(&texts, &labels).unwrap();
    let before = e.classify("survey deed boundary plan transfer of land", None);

    let err = e.train(&texts[..2], &labels[..3]).unwrap_err();
    assert!(matches!(err, sened_core::error::Error::TrainingFailure(_)));

    let after = e.classify("survey deed boundary plan transfer of land", None);
    assert_eq!(before.category, after.category);
    assert_eq!(before.confidence, after.confidence);
}

#[test]
fn trained_artifact_reloads_into_fresh_engine() {
    let dir = tempfile::tempdir().unwrap();
    let first = engine(&dir);
    let (texts, labels) = training_corpus();
    first.train(&texts, &labels).unwrap();
    let expected = first.classify("rent due under the tenancy between occupant and owner", None);

    let second = engine(&dir);
    assert!(!second.has_model());
    second.load_model();
    assert!(second.has_model());
    let got = second.classify("rent due under the tenancy between occupant and owner", None);
    assert_eq!(expected.category, got.category);
    assert_eq!(expected.confidence, got.confidence);
}

#[test]
fn language_hint_overrides_detection() {
    let dir = tempfile::tempdir().unwrap();
    let c = engine(&dir).classify("lease agreement", Some(Language::English));
    assert_eq!(c.language, Language::English);
}
