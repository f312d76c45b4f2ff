//! Word tokenization over normalized text.
//!
//! Splitting happens on anything that is not alphanumeric, which covers
//! both Latin and Ge'ez boundaries: Ethiopic syllables are alphabetic and
//! the normalizer has already turned the wordspace into punctuation. The
//! Ge'ez script has no case, so lowercasing only affects Latin tokens.
//! No morphological analysis is attempted.

use crate::types::Language;

/// Tokens shorter than this are noise (single letters, stray syllables).
pub const MIN_TOKEN_LEN: usize = 2;

/// Amharic function words and bound morphemes frequent enough to drown
/// content words.
const AMHARIC_STOP_WORDS: &[&str] = &[
    "እና", "ወይም", "ግን", "ነገር", "ወደ", "ከሆነ", "ከዚህ", "ከዚያ", "በዚህ", "በዚያ",
    "ስለ", "እንደ", "መሰረት", "አንደ", "የሚል", "ያለ", "ያለው", "እኔ", "አንተ", "እሱ",
    "እሷ", "እኛ", "አንትም", "እነሱ", "ሁሉ", "ሁሉም", "ነው", "ናቸው", "ነበር",
];

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he",
    "in", "is", "it", "its", "of", "on", "that", "the", "to", "was", "will",
    "with", "or", "but", "not", "this", "these", "they", "them", "their",
    "there", "then", "than", "so", "if", "when", "where", "why", "how", "what",
    "which", "who", "whom", "whose", "can", "could", "should", "would", "may",
    "might", "must", "shall", "do", "does", "did", "have", "had", "having",
];

const OROMO_STOP_WORDS: &[&str] = &[
    "fi", "kan", "akka", "kun", "sun", "kana", "keessa", "keessatti", "irra",
    "irratti", "itti", "waan", "dha", "hin", "ni", "isaa", "ishee", "keenya",
    "isin", "nuti", "ta'e", "jira", "jiru", "garuu", "yoo", "booda", "dura",
];

/// Union of all three stop-word lists, for analyzers that cannot be
/// parameterized per document language.
pub fn stop_word_union() -> impl Iterator<Item = &'static str> {
    AMHARIC_STOP_WORDS
        .iter()
        .chain(ENGLISH_STOP_WORDS)
        .chain(OROMO_STOP_WORDS)
        .copied()
}

/// Whether `token` (already lowercased) is a stop word for `language`.
/// Unknown-language text checks every set, since mixed documents are common.
pub fn is_stop_word(language: Language, token: &str) -> bool {
    match language {
        Language::Amharic => AMHARIC_STOP_WORDS.contains(&token),
        Language::Oromo => OROMO_STOP_WORDS.contains(&token),
        Language::English => ENGLISH_STOP_WORDS.contains(&token),
        Language::Unknown => {
            AMHARIC_STOP_WORDS.contains(&token)
                || ENGLISH_STOP_WORDS.contains(&token)
                || OROMO_STOP_WORDS.contains(&token)
        }
    }
}

/// Lazy, restartable token stream. Cloning restarts from the clone point;
/// calling [`tokenize`] again restarts from the beginning. Deterministic for
/// identical input.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    remaining: &'a str,
    language: Language,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let start = self
                .remaining
                .char_indices()
                .find(|(_, c)| c.is_alphanumeric())
                .map(|(i, _)| i)?;
            let rest = &self.remaining[start..];
            let end = rest
                .char_indices()
                .find(|(_, c)| !c.is_alphanumeric())
                .map(|(i, _)| i)
                .unwrap_or(rest.len());

            let word = &rest[..end];
            self.remaining = &rest[end..];

            if word.chars().count() < MIN_TOKEN_LEN {
                continue;
            }
            let token = word.to_lowercase();
            if is_stop_word(self.language, &token) {
                continue;
            }
            return Some(token);
        }
    }
}

/// Tokenize normalized text into meaningful words for `language`.
pub fn tokenize(text: &str, language: Language) -> Tokens<'_> {
    Tokens {
        remaining: text,
        language,
    }
}

/// Eager convenience over [`tokenize`].
pub fn meaningful_words(text: &str, language: Language) -> Vec<String> {
    tokenize(text, language).collect()
}

/// Token frequencies ordered by count descending, first occurrence breaking
/// ties so repeated runs are reproducible.
pub fn word_frequencies(text: &str, language: Language) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for token in tokenize(text, language) {
        if !counts.contains_key(&token) {
            order.push(token.clone());
        }
        *counts.entry(token).or_insert(0) += 1;
    }
    let mut freqs: Vec<(String, usize)> = order
        .into_iter()
        .map(|t| {
            let n = counts[&t];
            (t, n)
        })
        .collect();
    freqs.sort_by(|a, b| b.1.cmp(&a.1));
    freqs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_whitespace() {
        let tokens = meaningful_words("lease, rent; tenant", Language::English);
        assert_eq!(tokens, vec!["lease", "rent", "tenant"]);
    }

    #[test]
    fn geez_tokens_survive() {
        let tokens = meaningful_words("የቦታ ውል ሰነድ", Language::Amharic);
        assert_eq!(tokens, vec!["የቦታ", "ውል", "ሰነድ"]);
    }

    #[test]
    fn stop_words_and_short_tokens_drop() {
        let tokens = meaningful_words("the house of a tenant", Language::English);
        assert_eq!(tokens, vec!["house", "tenant"]);
        let tokens = meaningful_words("እና ሰነድ", Language::Amharic);
        assert_eq!(tokens, vec!["ሰነድ"]);
    }

    #[test]
    fn restartable_and_deterministic() {
        let a: Vec<String> = tokenize("plot survey deed", Language::English).collect();
        let b: Vec<String> = tokenize("plot survey deed", Language::English).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn frequencies_are_stable() {
        let f = word_frequencies("deed plot deed survey plot deed", Language::English);
        assert_eq!(f[0], ("deed".to_string(), 3));
        assert_eq!(f[1], ("plot".to_string(), 2));
        assert_eq!(f[2], ("survey".to_string(), 1));
    }
}
