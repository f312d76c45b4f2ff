//! Frequency-based key-phrase extraction feeding the document tag set.

use crate::script::normalize;
use crate::token::word_frequencies;
use crate::types::Language;

/// Latin tokens shorter than this carry little phrase signal. Ge'ez words
/// pack more meaning per character, so the tokenizer's minimum suffices.
const MIN_LATIN_PHRASE_LEN: usize = 3;

/// Extract up to `top_k` key phrases from raw text, most frequent first.
/// Ordering among equal counts follows first occurrence, keeping the
/// output deterministic.
pub fn extract_key_phrases(text: &str, language: Language, top_k: usize) -> Vec<String> {
    if text.trim().is_empty() || top_k == 0 {
        return Vec::new();
    }

    let normalized = normalize(text);
    word_frequencies(&normalized, language)
        .into_iter()
        .filter(|(token, _)| {
            token.chars().any(crate::script::is_ethiopic)
                || token.chars().count() >= MIN_LATIN_PHRASE_LEN
        })
        .take(top_k)
        .map(|(token, _)| token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_phrases_by_frequency() {
        let text = "lease lease lease tenant tenant property";
        let phrases = extract_key_phrases(text, Language::English, 2);
        assert_eq!(phrases, vec!["lease", "tenant"]);
    }

    #[test]
    fn mixed_script_phrases() {
        let phrases = extract_key_phrases("ውል ውል plot", Language::Unknown, 5);
        assert_eq!(phrases[0], "ውል");
        assert!(phrases.contains(&"plot".to_string()));
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(extract_key_phrases("", Language::English, 10).is_empty());
    }
}
