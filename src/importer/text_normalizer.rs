// ==========================================
// Cutlist Intake - Text Normalization Utilities
// ==========================================
// Scope: normalization, keyword extraction, fuzzy scoring, cell cleaning
// Used by: text parser, tabular parser, catalog matcher
// Rule: pure functions, no state
// ==========================================

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Tokens never used as matching keywords.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "per", "each", "mm", "cm", "inch", "inches", "sheet",
    "sheets", "panel", "panels", "board", "boards", "material", "materials", "color", "colour",
    "finish", "thick", "thickness", "pcs", "qty",
];

/// Finish / color vocabulary used to correlate edgebands with sheet materials.
pub const COLOR_KEYWORDS: &[&str] = &[
    "white", "black", "grey", "gray", "oak", "walnut", "maple", "cherry", "beech", "birch",
    "ash", "pine", "teak", "wenge", "elm", "hickory", "mahogany", "cream", "ivory", "beige",
    "brown", "red", "blue", "green", "yellow", "silver", "natural", "graphite", "anthracite",
    "charcoal", "sand", "stone", "concrete", "linen", "alpine", "gloss", "matt", "matte",
];

// ==========================================
// Normalization
// ==========================================

/// Lowercase, replace non-alphanumerics with spaces, collapse whitespace, trim.
///
/// Idempotent: `normalize_text(&normalize_text(x)) == normalize_text(x)`.
pub fn normalize_text(s: &str) -> String {
    let replaced: String = s
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Meaningful tokens of `s`: normalized, longer than 2 chars, not stop words.
/// Order of first appearance is kept; duplicates are dropped.
pub fn extract_keywords(s: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    normalize_text(s)
        .split(' ')
        .filter(|t| t.chars().count() > 2 && !STOP_WORDS.contains(t))
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// Similarity of two strings in [0, 1].
///
/// - equal (after normalization) → 1.0
/// - either empty → 0.0
/// - one contains the other → 0.7 + 0.3 × shorter/longer
/// - otherwise shared words / max(word counts)
pub fn fuzzy_score(a: &str, b: &str) -> f64 {
    let na = normalize_text(a);
    let nb = normalize_text(b);

    if na == nb && !na.is_empty() {
        return 1.0;
    }
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }

    if na.contains(&nb) || nb.contains(&na) {
        let (la, lb) = (na.chars().count() as f64, nb.chars().count() as f64);
        let ratio = la.min(lb) / la.max(lb);
        return 0.7 + 0.3 * ratio;
    }

    let words_a: HashSet<&str> = na.split(' ').collect();
    let words_b: HashSet<&str> = nb.split(' ').collect();
    let shared = words_a.intersection(&words_b).count() as f64;
    shared / words_a.len().max(words_b.len()) as f64
}

/// Color/finish tokens contained in `s`.
pub fn color_keywords(s: &str) -> Vec<&'static str> {
    let normalized = normalize_text(s);
    let tokens: HashSet<&str> = normalized.split(' ').collect();
    COLOR_KEYWORDS
        .iter()
        .copied()
        .filter(|c| tokens.contains(c))
        .collect()
}

/// True when both strings share a color/finish token.
pub fn shares_color_keyword(a: &str, b: &str) -> bool {
    let colors_b = color_keywords(b);
    color_keywords(a).iter().any(|c| colors_b.contains(c))
}

// ==========================================
// Cell cleaning
// ==========================================

/// Blank / whitespace-only cells become None.
pub fn clean_cell(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Spreadsheet truthy markers: yes / true / 1 / y / x / ✓ / ✔.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "yes" | "true" | "1" | "y" | "x" | "✓" | "✔"
    )
}

static NUMBER_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^([+-]?(?:\d+(?:[.,]\d+)*|[.,]\d+))\s*(?:mm|cm|in|inch|inches|"|pcs|pc)?$"#)
        .expect("number cell pattern")
});

static THOUSANDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d{1,3}(?:,\d{3})+$").expect("thousands pattern"));

/// Parse a numeric cell, tolerating a unit suffix and decimal commas.
///
/// "720" → 720, "720mm" → 720, "720,5" → 720.5, "1,200" → 1200, "abc" → None
pub fn parse_number(value: &str) -> Option<f64> {
    let caps = NUMBER_CELL.captures(value.trim())?;
    let raw = caps.get(1)?.as_str();

    let text = if raw.contains('.') && raw.contains(',') {
        raw.replace(',', "")
    } else if THOUSANDS.is_match(raw) {
        raw.replace(',', "")
    } else {
        raw.replace(',', ".")
    };

    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_basic() {
        assert_eq!(normalize_text("  White MELAMINE -- 18mm! "), "white melamine 18mm");
        assert_eq!(normalize_text("Oak/Veneer_(A)"), "oak veneer a");
        assert_eq!(normalize_text("!!!"), "");
    }

    #[test]
    fn test_normalize_text_idempotent() {
        for s in [
            "Side panel: 720x560 x2",
            "  ÉCRU  Ölmaple ",
            "İstanbul Oak",
            "a\tb\nc",
            "",
            "MDF-18 (raw)",
        ] {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once, "input {:?}", s);
        }
    }

    #[test]
    fn test_extract_keywords_drops_stop_words_and_short_tokens() {
        let kws = extract_keywords("White Melamine Board 18 mm on MDF");
        assert_eq!(kws, vec!["white", "melamine", "mdf"]);
    }

    #[test]
    fn test_extract_keywords_dedups() {
        assert_eq!(extract_keywords("oak oak veneer"), vec!["oak", "veneer"]);
    }

    #[test]
    fn test_fuzzy_score_equal_and_empty() {
        assert_eq!(fuzzy_score("White Oak", "white   oak"), 1.0);
        assert_eq!(fuzzy_score("", "oak"), 0.0);
        assert_eq!(fuzzy_score("", ""), 0.0);
    }

    #[test]
    fn test_fuzzy_score_containment() {
        // "white oak" (9) inside "white oak veneer" (16)
        let s = fuzzy_score("white oak", "White Oak Veneer");
        assert!((s - (0.7 + 0.3 * 9.0 / 16.0)).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_score_word_overlap() {
        // shared {white} over max(2, 3)
        let s = fuzzy_score("white melamine", "arctic white gloss");
        assert!((s - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(fuzzy_score("walnut", "black"), 0.0);
    }

    #[test]
    fn test_shares_color_keyword() {
        assert!(shares_color_keyword("White Melamine 18mm", "ABS white 1mm"));
        assert!(!shares_color_keyword("Oak Veneer", "Black ABS"));
        assert!(!shares_color_keyword("MDF", "PVC"));
    }

    #[test]
    fn test_is_truthy() {
        for v in ["yes", "TRUE", "1", "y", "X", "✓", " ✔ "] {
            assert!(is_truthy(v), "{:?}", v);
        }
        for v in ["no", "0", "", "n", "false"] {
            assert!(!is_truthy(v), "{:?}", v);
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("720"), Some(720.0));
        assert_eq!(parse_number(" 720 mm "), Some(720.0));
        assert_eq!(parse_number("720.5"), Some(720.5));
        assert_eq!(parse_number("720,5"), Some(720.5));
        assert_eq!(parse_number("1,200"), Some(1200.0));
        assert_eq!(parse_number("1,200.5"), Some(1200.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("  "), None);
        assert_eq!(clean_cell(" a "), Some("a"));
    }
}
