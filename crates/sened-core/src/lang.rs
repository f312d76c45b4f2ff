//! Heuristic language detection.
//!
//! Ge'ez character ratio separates Amharic from Latin-script text; Afaan
//! Oromo is told apart from English by its characteristic function words.
//! Cheap and wrong sometimes, which is why callers may pass an explicit
//! language hint instead.

use crate::script::is_ethiopic;
use crate::types::Language;

/// Ratio of Ge'ez characters at or above which text counts as Amharic.
const GEEZ_RATIO_THRESHOLD: f32 = 0.3;

/// Distinctly Oromo function words; two hits tip Latin text to Oromo.
const OROMO_MARKERS: &[&str] = &[
    "fi", "kan", "akka", "keessa", "keessatti", "irratti", "waan", "kana",
    "garuu", "yoo", "jira", "jiru", "ta'e", "dha", "lafa", "mana",
];

/// Detect the dominant language of `text`. Returns the language and a
/// confidence ratio in [0,1]. Empty input is `Unknown` with 0.0.
pub fn detect_language(text: &str) -> (Language, f32) {
    if text.trim().is_empty() {
        return (Language::Unknown, 0.0);
    }

    let total = text.chars().count();
    let geez = text.chars().filter(|c| is_ethiopic(*c)).count();
    let geez_ratio = geez as f32 / total as f32;

    if geez_ratio >= GEEZ_RATIO_THRESHOLD {
        return (Language::Amharic, geez_ratio);
    }

    // Stop-word filtering would strip exactly the function words that make
    // Oromo recognizable, so split on raw whitespace here.
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();
    if tokens.is_empty() {
        return (Language::Unknown, 0.0);
    }
    let oromo_hits = tokens
        .iter()
        .filter(|t| OROMO_MARKERS.contains(&t.as_str()))
        .count();
    if oromo_hits >= 2 {
        let ratio = oromo_hits as f32 / tokens.len() as f32;
        return (Language::Oromo, ratio.max(0.5));
    }

    (Language::English, 1.0 - geez_ratio)
}
