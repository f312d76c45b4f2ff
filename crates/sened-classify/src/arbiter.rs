//! Classification engine combining the rule table with the learned model.
//!
//! Rules get a fast path: a high-confidence rule hit short-circuits the
//! learned model entirely, which keeps the common registry forms cheap and
//! fully explainable. Below that bar both signals are computed and the
//! stronger one wins. Results under the floor threshold collapse to
//! `other` while keeping their confidence for diagnostics.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use sened_core::config::Thresholds;
use sened_core::error::Error;
use sened_core::lang::detect_language;
use sened_core::script::normalize;
use sened_core::token::meaningful_words;
use sened_core::types::{Category, Classification, Language};

use crate::model::LearnedModel;
use crate::rules::RuleSet;

pub struct ClassifierEngine {
    rules: RwLock<RuleSet>,
    model: RwLock<Option<Arc<LearnedModel>>>,
    model_path: PathBuf,
    thresholds: Thresholds,
}

impl ClassifierEngine {
    /// Build an engine with the given rule table. The model slot starts
    /// empty; call [`load_model`](Self::load_model) or
    /// [`train`](Self::train) to fill it.
    pub fn new(rules: RuleSet, model_path: impl Into<PathBuf>, thresholds: Thresholds) -> Self {
        Self {
            rules: RwLock::new(rules),
            model: RwLock::new(None),
            model_path: model_path.into(),
            thresholds,
        }
    }

    /// Engine with the built-in rule table.
    pub fn with_builtin_rules(model_path: impl Into<PathBuf>, thresholds: Thresholds) -> Self {
        Self::new(RuleSet::builtin(), model_path, thresholds)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn has_model(&self) -> bool {
        self.model.read().map(|m| m.is_some()).unwrap_or(false)
    }

    /// Load a previously trained artifact from `model_path`. Missing or
    /// unreadable artifacts leave the slot empty rather than failing the
    /// engine.
    pub fn load_model(&self) {
        match LearnedModel::load(&self.model_path) {
            Ok(model) => {
                if let Ok(mut slot) = self.model.write() {
                    *slot = Some(Arc::new(model));
                    info!(path = %self.model_path.display(), "loaded classifier model");
                }
            }
            Err(err) => {
                debug!(path = %self.model_path.display(), %err, "no classifier model loaded");
            }
        }
    }

    /// Extend the rule table at runtime.
    pub fn add_rule_keywords<I, S>(&self, language: Language, category: Category, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Ok(mut rules) = self.rules.write() {
            rules.add_keywords(language, category, keywords);
        }
    }

    /// Classify a text. `language_hint` skips detection when the caller
    /// already knows the language.
    pub fn classify(&self, text: &str, language_hint: Option<Language>) -> Classification {
        if text.trim().is_empty() {
            return Classification {
                category: Category::Other,
                confidence: 0.0,
                matched_tags: Vec::new(),
                language: Language::Unknown,
            };
        }

        let language = match language_hint {
            Some(lang) => lang,
            None => detect_language(text).0,
        };
        let normalized = normalize(text);
        let tokens = meaningful_words(&normalized, language);

        let rule_outcome = match self.rules.read() {
            Ok(rules) => rules.classify(&normalized, &tokens, self.thresholds.rule_coverage_boost),
            Err(_) => crate::rules::RuleOutcome {
                category: Category::Other,
                confidence: 0.0,
                matched_keywords: Vec::new(),
            },
        };

        // Fast path: a confident rule hit never consults the model, so the
        // outcome stays stable across retraining.
        if rule_outcome.confidence >= self.thresholds.rule_threshold {
            debug!(
                category = rule_outcome.category.name(),
                confidence = rule_outcome.confidence,
                "rule fast path"
            );
            return Classification {
                category: rule_outcome.category,
                confidence: rule_outcome.confidence.clamp(0.0, 1.0),
                matched_tags: rule_outcome.matched_keywords,
                language,
            };
        }

        let model = self.model.read().ok().and_then(|m| m.clone());
        let (category, confidence, matched_tags) = match model {
            Some(model) => {
                let (ml_category, ml_confidence) = model.predict(text);
                if ml_confidence > rule_outcome.confidence {
                    (ml_category, ml_confidence, Vec::new())
                } else {
                    (
                        rule_outcome.category,
                        rule_outcome.confidence,
                        rule_outcome.matched_keywords,
                    )
                }
            }
            None => (
                rule_outcome.category,
                rule_outcome.confidence,
                rule_outcome.matched_keywords,
            ),
        };

        let confidence = confidence.clamp(0.0, 1.0);
        // Below the floor nothing is trustworthy enough to assert a
        // category, but the confidence survives for diagnostics.
        let category = if confidence < self.thresholds.floor_threshold {
            Category::Other
        } else {
            category
        };

        Classification {
            category,
            confidence,
            matched_tags,
            language,
        }
    }

    /// Train a fresh model and swap it in atomically. On failure the
    /// previous model (in memory and on disk) stays in place.
    pub fn train(&self, texts: &[String], labels: &[Category]) -> Result<(), Error> {
        let model = LearnedModel::train(texts, labels)?;
        if let Err(err) = model.save(&self.model_path) {
            warn!(path = %self.model_path.display(), %err, "failed to persist model artifact");
            return Err(Error::TrainingFailure(format!(
                "could not persist model artifact: {err}"
            )));
        }
        let mut slot = self
            .model
            .write()
            .map_err(|_| Error::TrainingFailure("model slot poisoned".to_string()))?;
        *slot = Some(Arc::new(model));
        Ok(())
    }
}
