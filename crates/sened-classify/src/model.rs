//! Learned text classifier: tf-idf features into multinomial naive bayes.
//!
//! Trained offline from (text, label) pairs, serialized as a JSON artifact,
//! and replaced wholesale on retraining. Probabilities come straight out of
//! the bayes posterior, so no separate calibration pass is needed. Text
//! that maps to zero known features yields the uniform distribution.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sened_core::error::Error;
use sened_core::script::normalize;
use sened_core::token::tokenize;
use sened_core::types::{Category, Language};

/// Vectorizer settings shared by training and inference.
const MAX_FEATURES: usize = 5000;
const MIN_DF: usize = 2;
const SMOOTHING_ALPHA: f64 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedModel {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    labels: Vec<Category>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl LearnedModel {
    /// Uni- and bigram features over language-agnostic tokenization, so
    /// one model serves all three languages (the stop-word union applies).
    fn grams(text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let tokens: Vec<String> = tokenize(&normalized, Language::Unknown).collect();
        let mut grams = tokens.clone();
        for pair in tokens.windows(2) {
            grams.push(format!("{} {}", pair[0], pair[1]));
        }
        grams
    }

    /// Fit a model from parallel texts and labels.
    pub fn train(texts: &[String], labels: &[Category]) -> Result<Self, Error> {
        if texts.is_empty() || labels.is_empty() {
            return Err(Error::TrainingFailure(
                "texts and labels must be non-empty".to_string(),
            ));
        }
        if texts.len() != labels.len() {
            return Err(Error::TrainingFailure(format!(
                "got {} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let docs: Vec<Vec<String>> = texts.iter().map(|t| Self::grams(t)).collect();

        // Document frequencies, first-seen order retained for determinism.
        let mut df: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for doc in &docs {
            let mut seen: Vec<&str> = Vec::new();
            for gram in doc {
                if !seen.contains(&gram.as_str()) {
                    seen.push(gram);
                    let entry = df.entry(gram).or_insert(0);
                    if *entry == 0 {
                        order.push(gram);
                    }
                    *entry += 1;
                }
            }
        }

        // min_df prunes noise, but tiny corpora would lose everything; in
        // that case fall back to df >= 1.
        let mut selected: Vec<&str> = order
            .iter()
            .copied()
            .filter(|g| df[g] >= MIN_DF)
            .collect();
        if selected.is_empty() {
            debug!("min_df left no features, falling back to df >= 1");
            selected = order.clone();
        }
        if selected.is_empty() {
            return Err(Error::TrainingFailure(
                "training texts contain no usable tokens".to_string(),
            ));
        }
        selected.sort_by(|a, b| df[b].cmp(&df[a]));
        selected.truncate(MAX_FEATURES);

        let vocabulary: HashMap<String, usize> = selected
            .iter()
            .enumerate()
            .map(|(i, g)| ((*g).to_string(), i))
            .collect();
        let n_docs = docs.len() as f32;
        let mut idf = vec![0.0f32; vocabulary.len()];
        for (gram, idx) in &vocabulary {
            let d = df[gram.as_str()] as f32;
            idf[*idx] = ((1.0 + n_docs) / (1.0 + d)).ln() + 1.0;
        }

        // Label vocabulary in first-seen order.
        let mut label_list: Vec<Category> = Vec::new();
        for label in labels {
            if !label_list.contains(label) {
                label_list.push(*label);
            }
        }

        let v = vocabulary.len();
        let mut class_counts = vec![0usize; label_list.len()];
        let mut feature_sums = vec![vec![0.0f64; v]; label_list.len()];
        for (doc, label) in docs.iter().zip(labels) {
            let class = label_list.iter().position(|l| l == label).expect("seen label");
            class_counts[class] += 1;
            for (idx, value) in Self::vectorize_grams(doc, &vocabulary, &idf) {
                feature_sums[class][idx] += f64::from(value);
            }
        }

        let total_docs = labels.len() as f64;
        let class_log_prior: Vec<f64> = class_counts
            .iter()
            .map(|n| (*n as f64 / total_docs).ln())
            .collect();
        let feature_log_prob: Vec<Vec<f64>> = feature_sums
            .iter()
            .map(|sums| {
                let class_total: f64 = sums.iter().sum();
                let denom = class_total + SMOOTHING_ALPHA * v as f64;
                sums.iter()
                    .map(|s| ((s + SMOOTHING_ALPHA) / denom).ln())
                    .collect()
            })
            .collect();

        info!(
            documents = texts.len(),
            features = v,
            labels = label_list.len(),
            "trained classifier model"
        );
        Ok(Self {
            vocabulary,
            idf,
            labels: label_list,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Sparse tf-idf vector for a gram list, L2-normalized.
    fn vectorize_grams(
        grams: &[String],
        vocabulary: &HashMap<String, usize>,
        idf: &[f32],
    ) -> Vec<(usize, f32)> {
        let mut tf: HashMap<usize, f32> = HashMap::new();
        for gram in grams {
            if let Some(idx) = vocabulary.get(gram) {
                *tf.entry(*idx).or_insert(0.0) += 1.0;
            }
        }
        let mut entries: Vec<(usize, f32)> =
            tf.into_iter().map(|(i, f)| (i, f * idf[i])).collect();
        let norm = entries.iter().map(|(_, x)| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, x) in &mut entries {
                *x /= norm;
            }
        }
        entries.sort_by_key(|(i, _)| *i);
        entries
    }

    pub fn labels(&self) -> &[Category] {
        &self.labels
    }

    /// Probability distribution over the label vocabulary. Zero known
    /// features produce the uniform distribution (maximal uncertainty).
    pub fn predict_proba(&self, text: &str) -> Vec<(Category, f32)> {
        let grams = Self::grams(text);
        let features = Self::vectorize_grams(&grams, &self.vocabulary, &self.idf);
        let n = self.labels.len();
        if features.is_empty() || n == 0 {
            let uniform = if n == 0 { 0.0 } else { 1.0 / n as f32 };
            return self.labels.iter().map(|l| (*l, uniform)).collect();
        }

        let mut joint: Vec<f64> = self.class_log_prior.clone();
        for (class, j) in joint.iter_mut().enumerate() {
            for (idx, value) in &features {
                *j += f64::from(*value) * self.feature_log_prob[class][*idx];
            }
        }

        // Softmax in log space.
        let max = joint.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = joint.iter().map(|j| (j - max).exp()).collect();
        let sum: f64 = exp.iter().sum();
        self.labels
            .iter()
            .zip(exp)
            .map(|(l, e)| (*l, (e / sum) as f32))
            .collect()
    }

    /// Arg-max of [`predict_proba`]; earlier labels win exact ties.
    pub fn predict(&self, text: &str) -> (Category, f32) {
        let probs = self.predict_proba(text);
        let mut best = (Category::Other, 0.0f32);
        for (label, p) in probs {
            if p > best.1 {
                best = (label, p);
            }
        }
        best
    }

    /// Persist the artifact atomically: write to a temp file in the target
    /// directory, then rename over the destination. A crash mid-write
    /// leaves the previous artifact intact.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut tmp, self)?;
        tmp.flush()?;
        tmp.persist(path)?;
        debug!(path = %path.display(), "saved model artifact");
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&data)?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> (Vec<String>, Vec<Category>) {
        let texts = vec![
            "lease agreement between tenant and landlord for rent".to_string(),
            "monthly rent payment due under the lease contract".to_string(),
            "land plot survey with boundary markers and deed".to_string(),
            "survey plan of the land parcel and deed transfer".to_string(),
        ];
        let labels = vec![
            Category::Housing,
            Category::Housing,
            Category::LandPlans,
            Category::LandPlans,
        ];
        (texts, labels)
    }

    #[test]
    fn predicts_trained_classes() {
        let (texts, labels) = corpus();
        let model = LearnedModel::train(&texts, &labels).unwrap();
        let (cat, conf) = model.predict("tenant signed the lease for rent");
        assert_eq!(cat, Category::Housing);
        assert!(conf > 0.5 && conf <= 1.0);
        let (cat, _) = model.predict("boundary survey of the plot deed");
        assert_eq!(cat, Category::LandPlans);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (texts, labels) = corpus();
        let model = LearnedModel::train(&texts, &labels).unwrap();
        let probs = model.predict_proba("lease for the plot");
        let sum: f32 = probs.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[test]
    fn unknown_text_is_uniform() {
        let (texts, labels) = corpus();
        let model = LearnedModel::train(&texts, &labels).unwrap();
        let probs = model.predict_proba("ዜና እወጃ");
        for (_, p) in &probs {
            assert!((p - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn mismatched_lengths_fail_training() {
        let err = LearnedModel::train(&["a".to_string()], &[]).unwrap_err();
        assert!(matches!(err, Error::TrainingFailure(_)));
    }

    #[test]
    fn artifact_round_trips() {
        let (texts, labels) = corpus();
        let model = LearnedModel::train(&texts, &labels).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.json");
        model.save(&path).unwrap();
        let loaded = LearnedModel::load(&path).unwrap();
        assert_eq!(model.predict("rent lease"), loaded.predict("rent lease"));
    }
}
