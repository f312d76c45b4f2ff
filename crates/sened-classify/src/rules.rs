//! Keyword-rule classification.
//!
//! A rule set maps categories to ordered keyword lists. Scoring counts
//! distinct matched keywords weighted by specificity (a keyword shared by
//! several categories is worth less), normalizes by the category's keyword
//! weight up to a fixed bound, and scales by a tunable coverage boost.
//! Everything here is deterministic given the current rule set; ties go to
//! the category declared earliest.

use sened_core::script::is_ethiopic;
use sened_core::types::{Category, Language};
use std::collections::HashSet;

/// Rule scores below this carry no signal at all; the outcome collapses to
/// `other` with zero confidence.
const MIN_RULE_SIGNAL: f32 = 0.1;

/// Upper bound on the normalization denominator. Coverage is measured
/// against at most this much keyword weight, so growing a category's
/// keyword table never dilutes the score of the keywords that did match.
const MAX_COVERAGE_WEIGHT: f32 = 3.0;

#[derive(Debug, Clone)]
pub struct RuleKeyword {
    /// Lowercased, normalized keyword or phrase.
    pub text: String,
    pub language: Language,
}

#[derive(Debug, Clone)]
pub struct CategoryRules {
    pub category: Category,
    /// Insertion order is preserved for inspection and audit.
    pub keywords: Vec<RuleKeyword>,
}

#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    categories: Vec<CategoryRules>,
}

/// Result of scoring one text against the rule set.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub category: Category,
    pub confidence: f32,
    pub matched_keywords: Vec<String>,
}

impl RuleOutcome {
    fn none() -> Self {
        Self {
            category: Category::Other,
            confidence: 0.0,
            matched_keywords: Vec::new(),
        }
    }
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default keyword table for the Ethiopian registry domain, in English
    /// and Amharic. Callers extend it at runtime or override it wholesale
    /// from configuration.
    pub fn builtin() -> Self {
        let mut rules = Self::new();
        rules.add_keywords(
            Language::English,
            Category::Demographics,
            ["name", "age", "gender", "address", "marital", "birth", "nationality"],
        );
        rules.add_keywords(
            Language::Amharic,
            Category::Demographics,
            ["እድሜ", "ጾታ", "ስም", "አድራሻ"],
        );
        rules.add_keywords(
            Language::English,
            Category::Housing,
            ["lease", "rent", "tenant", "landlord", "property", "housing", "contract"],
        );
        rules.add_keywords(
            Language::Amharic,
            Category::Housing,
            ["ቤት", "ሕንጻ", "ኪራይ", "ኪራይ ስምምነት"],
        );
        rules.add_keywords(
            Language::English,
            Category::IdRegistry,
            ["passport", "identification", "registry", "certificate", "birth certificate"],
        );
        rules.add_keywords(
            Language::Amharic,
            Category::IdRegistry,
            ["መታወቂያ", "ፓስፖርት", "ማረጋገጫ"],
        );
        rules.add_keywords(
            Language::English,
            Category::LandPlans,
            ["land", "plot", "survey", "deed", "plan", "boundary"],
        );
        rules.add_keywords(
            Language::Amharic,
            Category::LandPlans,
            ["መሬት", "ካርታ", "እቅድ", "መለኪያ"],
        );
        rules
    }

    /// Append keywords for a category, preserving order and skipping
    /// duplicates. Creates the category entry on first use.
    pub fn add_keywords<I, S>(&mut self, language: Language, category: Category, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = match self.categories.iter_mut().find(|c| c.category == category) {
            Some(entry) => entry,
            None => {
                self.categories.push(CategoryRules {
                    category,
                    keywords: Vec::new(),
                });
                self.categories.last_mut().expect("just pushed")
            }
        };
        for kw in keywords {
            let text = kw.as_ref().trim().to_lowercase();
            if text.is_empty() || entry.keywords.iter().any(|k| k.text == text) {
                continue;
            }
            entry.keywords.push(RuleKeyword { text, language });
        }
    }

    pub fn categories(&self) -> &[CategoryRules] {
        &self.categories
    }

    /// 1 / (number of categories listing this keyword): rarer keywords
    /// weigh more.
    fn specificity(&self, keyword: &str) -> f32 {
        let shared = self
            .categories
            .iter()
            .filter(|c| c.keywords.iter().any(|k| k.text == keyword))
            .count();
        1.0 / shared.max(1) as f32
    }

    /// Score `normalized_text` (with its token list) against every
    /// category. `coverage_boost` scales the normalized coverage score and
    /// is the calibration knob for how much one specific match counts.
    pub fn classify(
        &self,
        normalized_text: &str,
        tokens: &[String],
        coverage_boost: f32,
    ) -> RuleOutcome {
        if tokens.is_empty() && normalized_text.is_empty() {
            return RuleOutcome::none();
        }
        let text_lower = normalized_text.to_lowercase();
        let token_set: HashSet<&str> = tokens.iter().map(String::as_str).collect();

        let mut best: Option<RuleOutcome> = None;
        for cat in &self.categories {
            if cat.keywords.is_empty() {
                continue;
            }
            let mut matched = Vec::new();
            let mut matched_weight = 0.0f32;
            let mut total_weight = 0.0f32;
            for kw in &cat.keywords {
                let w = self.specificity(&kw.text);
                total_weight += w;
                if keyword_matches(&kw.text, &text_lower, &token_set, tokens) {
                    matched.push(kw.text.clone());
                    matched_weight += w;
                }
            }
            if matched.is_empty() || total_weight <= 0.0 {
                continue;
            }
            let score = ((matched_weight / total_weight.min(MAX_COVERAGE_WEIGHT))
                * coverage_boost)
                .min(1.0);
            // Strictly-greater comparison keeps the earliest-declared
            // category on ties.
            if best.as_ref().map(|b| score > b.confidence).unwrap_or(true) {
                best = Some(RuleOutcome {
                    category: cat.category,
                    confidence: score,
                    matched_keywords: matched,
                });
            }
        }

        match best {
            Some(outcome) if outcome.confidence >= MIN_RULE_SIGNAL => outcome,
            _ => RuleOutcome::none(),
        }
    }
}

/// A Latin keyword must match a whole token (or phrase on word
/// boundaries); a Ge'ez keyword also matches inside a token, absorbing
/// prefix morphemes such as የ-, በ-, ለ-.
fn keyword_matches(
    keyword: &str,
    text_lower: &str,
    token_set: &HashSet<&str>,
    tokens: &[String],
) -> bool {
    if keyword.contains(' ') {
        return phrase_matches(text_lower, keyword);
    }
    if token_set.contains(keyword) {
        return true;
    }
    if keyword.chars().any(is_ethiopic) {
        return tokens.iter().any(|t| t.contains(keyword));
    }
    false
}

/// Substring match with alphanumeric boundaries on both sides.
fn phrase_matches(text: &str, phrase: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = text[start..].find(phrase) {
        let abs = start + pos;
        let before_ok = text[..abs]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        let after_ok = text[abs + phrase.len()..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        if before_ok && after_ok {
            return true;
        }
        start = abs + phrase.len();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use sened_core::script::normalize;
    use sened_core::token::meaningful_words;

    fn outcome(rules: &RuleSet, text: &str) -> RuleOutcome {
        let normalized = normalize(text);
        let tokens = meaningful_words(&normalized, Language::Unknown);
        rules.classify(&normalized, &tokens, 2.5)
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut rules = RuleSet::new();
        rules.add_keywords(Language::English, Category::Housing, ["rent", "lease"]);
        rules.add_keywords(Language::English, Category::Housing, ["lease", "tenant"]);
        let kws: Vec<&str> = rules.categories()[0]
            .keywords
            .iter()
            .map(|k| k.text.as_str())
            .collect();
        assert_eq!(kws, vec!["rent", "lease", "tenant"]);
    }

    #[test]
    fn geez_keyword_matches_inside_token() {
        let mut rules = RuleSet::new();
        rules.add_keywords(Language::English, Category::Housing, ["house", "plot"]);
        rules.add_keywords(Language::Amharic, Category::Housing, ["ቦታ"]);
        let o = outcome(&rules, "የቦታ ውል ሰነድ");
        assert_eq!(o.category, Category::Housing);
        assert!(o.confidence >= 0.8, "confidence {}", o.confidence);
        assert_eq!(o.matched_keywords, vec!["ቦታ"]);
    }

    #[test]
    fn latin_keyword_needs_whole_token() {
        let mut rules = RuleSet::new();
        rules.add_keywords(Language::English, Category::LandPlans, ["plan"]);
        let o = outcome(&rules, "the planet is large");
        assert_eq!(o.category, Category::Other);
        assert_eq!(o.confidence, 0.0);
    }

    #[test]
    fn phrases_match_on_word_boundaries() {
        let mut rules = RuleSet::new();
        rules.add_keywords(
            Language::English,
            Category::IdRegistry,
            ["birth certificate", "passport"],
        );
        let o = outcome(&rules, "attached is the birth certificate copy");
        assert_eq!(o.category, Category::IdRegistry);
        assert!(!o.matched_keywords.is_empty());
    }

    #[test]
    fn shared_keywords_weigh_less_than_specific_ones() {
        let mut rules = RuleSet::new();
        // "record" is shared; "lease" and "deed" are specific.
        rules.add_keywords(Language::English, Category::Housing, ["record", "lease"]);
        rules.add_keywords(Language::English, Category::LandPlans, ["record", "deed"]);
        let o = outcome(&rules, "deed record");
        assert_eq!(o.category, Category::LandPlans);
        let weak = outcome(&rules, "record only");
        // A shared keyword alone scores below a specific one.
        assert!(weak.confidence < o.confidence);
    }

    #[test]
    fn large_keyword_tables_do_not_dilute_single_matches() {
        let mut rules = RuleSet::builtin();
        rules.add_keywords(Language::Amharic, Category::Housing, ["ቦታ"]);
        // The builtin housing list is a dozen keywords long; one specific
        // match must still clear the fast-path threshold.
        let o = outcome(&rules, "የቦታ ውል ሰነድ");
        assert_eq!(o.category, Category::Housing);
        assert!(o.confidence >= 0.8, "confidence {}", o.confidence);
        assert_eq!(o.matched_keywords, vec!["ቦታ"]);
    }

    #[test]
    fn ties_go_to_earliest_category() {
        let mut rules = RuleSet::new();
        rules.add_keywords(Language::English, Category::Demographics, ["census"]);
        rules.add_keywords(Language::English, Category::Housing, ["census"]);
        let o = outcome(&rules, "census data");
        assert_eq!(o.category, Category::Demographics);
    }
}
