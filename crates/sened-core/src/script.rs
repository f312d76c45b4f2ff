//! Script-aware text normalization.
//!
//! Canonicalizes raw extracted text before tokenization: Ethiopic
//! punctuation and numerals are mapped to ASCII equivalents, control
//! characters are stripped, and whitespace is collapsed. Pure functions,
//! no I/O; empty input normalizes to an empty string.

/// Ethiopic punctuation mapped to ASCII. The wordspace (፡) historically
/// separates words, so it maps to a boundary the tokenizer will split on.
const ETHIOPIC_PUNCTUATION: &[(char, &str)] = &[
    ('፡', "."),
    ('።', "."),
    ('፣', ","),
    ('፤', ";"),
    ('፥', ":"),
    ('፦', "::"),
    ('፧', "?"),
    ('፨', "¶"),
];

/// Ethiopic numerals. The script has no zero and uses composed values for
/// tens and hundreds; each sign maps to its full decimal spelling.
const ETHIOPIC_DIGITS: &[(char, &str)] = &[
    ('፩', "1"),
    ('፪', "2"),
    ('፫', "3"),
    ('፬', "4"),
    ('፭', "5"),
    ('፮', "6"),
    ('፯', "7"),
    ('፰', "8"),
    ('፱', "9"),
    ('፲', "10"),
    ('፳', "20"),
    ('፴', "30"),
    ('፵', "40"),
    ('፶', "50"),
    ('፷', "60"),
    ('፸', "70"),
    ('፹', "80"),
    ('፺', "90"),
    ('፻', "100"),
];

/// Whether a character belongs to the Ge'ez (Ethiopic) script blocks:
/// main block, supplement, and extended.
pub fn is_ethiopic(c: char) -> bool {
    matches!(c,
        '\u{1200}'..='\u{137F}' | '\u{1380}'..='\u{139F}' | '\u{2D80}'..='\u{2DDF}')
}

fn map_ethiopic(c: char) -> Option<&'static str> {
    ETHIOPIC_PUNCTUATION
        .iter()
        .chain(ETHIOPIC_DIGITS.iter())
        .find(|(from, _)| *from == c)
        .map(|(_, to)| *to)
}

/// Canonicalize text: per-script punctuation and numeral mapping, control
/// character removal, whitespace collapse.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if let Some(mapped) = map_ethiopic(c) {
            out.push_str(mapped);
        } else if c.is_control() {
            // Tabs and newlines become boundaries; other controls vanish.
            if c == '\n' || c == '\r' || c == '\t' {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }

    // Collapse runs of whitespace and trim.
    let mut collapsed = String::with_capacity(out.len());
    for word in out.split_whitespace() {
        if !collapsed.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(word);
    }
    collapsed
}
