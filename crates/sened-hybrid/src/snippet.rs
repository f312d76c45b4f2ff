//! Result snippets: a window of text around the first query-term hit.

/// Query terms shorter than this are too common to anchor a snippet.
const MIN_SNIPPET_TERM_LEN: usize = 3;

/// Build a snippet of up to `max_length` characters centered on the first
/// occurrence of any query term. Falls back to a plain prefix when the
/// query is empty or none of its terms occur. All offsets are character
/// offsets, so multi-byte scripts never get split mid-glyph.
pub fn create_snippet(text: &str, query: &str, max_length: usize) -> String {
    let terms: Vec<Vec<char>> = query
        .split_whitespace()
        .filter(|t| t.chars().count() >= MIN_SNIPPET_TERM_LEN)
        .map(|t| lower_chars(t))
        .collect();
    if terms.is_empty() {
        return prefix(text, max_length);
    }

    let chars: Vec<char> = text.chars().collect();
    let lowered = lower_chars(text);
    let first_pos = terms
        .iter()
        .filter_map(|term| find_chars(&lowered, term))
        .min();
    let Some(first_pos) = first_pos else {
        return prefix(text, max_length);
    };

    let start = first_pos.saturating_sub(max_length / 2);
    let end = (first_pos + max_length / 2).min(chars.len());
    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str("...");
    }
    snippet.extend(&chars[start..end]);
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet
}

fn prefix(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let mut s: String = text.chars().take(max_length).collect();
        s.push_str("...");
        s
    }
}

/// Per-character lowercasing keeps offsets aligned with the source text;
/// the Ge'ez script has no case to fold anyway.
fn lower_chars(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_on_first_term_occurrence() {
        let text = format!("{} lease here {}", "x".repeat(300), "y".repeat(300));
        let s = create_snippet(&text, "lease", 40);
        assert!(s.contains("lease"));
        assert!(s.starts_with("..."));
        assert!(s.ends_with("..."));
    }

    #[test]
    fn empty_query_returns_prefix() {
        let text = "a".repeat(250);
        let s = create_snippet(&text, "", 200);
        assert_eq!(s.chars().count(), 203);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn short_text_is_returned_whole() {
        assert_eq!(create_snippet("short text", "missing", 200), "short text");
    }

    #[test]
    fn geez_text_is_not_split_mid_glyph() {
        let text = "የመሬት ካርታ ሰነድ ".repeat(50);
        let s = create_snippet(&text, "ካርታ", 30);
        assert!(s.contains("ካርታ"));
        // Valid UTF-8 output is implied by String, but the window must
        // still be bounded.
        assert!(s.chars().count() <= 30 + 6);
    }
}
