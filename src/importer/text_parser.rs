// ==========================================
// Cutlist Intake - Free Text Parser
// ==========================================
// Scope: one line of free text (typed, pasted, voice transcript) → one draft CutPart
// Stages: dimensions → quantity → grain → label → material hints → thickness → edges
// Rule: every ladder is an ordered (pattern, extractor) list, first match wins
// ==========================================

use crate::config::parse_options::TextParseOptions;
use crate::domain::part::{CutPart, EdgeSpec, PartAudit, PartSize, DEFAULT_MATERIAL_ID};
use crate::domain::types::{DimOrder, EdgeId, Grain, UnitSystem};
use crate::importer::text_normalizer::COLOR_KEYWORDS;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{debug, info, instrument};

/// Largest quantity accepted from free text.
pub const MAX_TEXT_QTY: u64 = 1000;

/// Plausible panel thickness range (mm).
pub const THICKNESS_RANGE_MM: (f64, f64) = (3.0, 100.0);

// Confidence factors (multiplied into the line score)
const QTY_DEFAULT_FACTOR: f64 = 0.95;
const QTY_REJECTED_FACTOR: f64 = 0.85;
const GRAIN_DEFAULT_FACTOR: f64 = 0.98;

/// Words that hint at a sheet material or its finish.
const MATERIAL_KEYWORDS: &[&str] = &[
    "melamine", "mfc", "mdf", "hdf", "plywood", "ply", "particleboard", "chipboard", "osb",
    "veneer", "veneered", "laminate", "hpl", "acrylic", "lacquer", "lacquered", "solid",
    "hardwood", "softwood",
];

// ==========================================
// Results
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextParseResult {
    pub line_number: usize,
    pub raw: String,
    /// None when the line is fatal (no dimensions)
    pub part: Option<CutPart>,
    pub confidence: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl TextParseResult {
    fn failed(line_number: usize, raw: String, error: impl Into<String>) -> Self {
        Self {
            line_number,
            raw,
            part: None,
            confidence: 0.0,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }
}

/// Aggregate statistics over a batch of parse results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total: usize,
    pub parsed: usize,
    pub errors: usize,
    pub avg_confidence: f64,
}

impl ParseStats {
    /// Build from (produced a part?, confidence) pairs.
    pub fn collect<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (bool, f64)>,
    {
        let mut stats = ParseStats::default();
        let mut sum = 0.0;
        for (parsed, confidence) in items {
            stats.total += 1;
            if parsed {
                stats.parsed += 1;
            } else {
                stats.errors += 1;
            }
            sum += confidence;
        }
        if stats.total > 0 {
            stats.avg_confidence = sum / stats.total as f64;
        }
        stats
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBatchResult {
    pub results: Vec<TextParseResult>,
    pub stats: ParseStats,
}

// ==========================================
// Dimension ladder
// ==========================================

struct RawDims {
    first: f64,
    second: f64,
    third: Option<f64>,
    /// Some(true) when the text labels the first value as L
    first_is_length: Option<bool>,
    /// Piece count read in front of the dimensions ("2x720x560")
    count: Option<u64>,
}

type DimExtractor = fn(&Captures, UnitSystem) -> Option<RawDims>;

struct DimensionPattern {
    name: &'static str,
    regex: Regex,
    confidence: f64,
    extract: DimExtractor,
}

impl DimensionPattern {
    fn new(name: &'static str, pattern: &str, confidence: f64, extract: DimExtractor) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("dimension pattern"),
            confidence,
            extract,
        }
    }
}

fn capture_number(caps: &Captures, idx: usize) -> Option<f64> {
    caps.get(idx)?
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn extract_labeled(caps: &Captures, unit: UnitSystem, first_is_length: bool) -> Option<RawDims> {
    let f = unit.to_mm_factor();
    Some(RawDims {
        first: capture_number(caps, 1)? * f,
        second: capture_number(caps, 2)? * f,
        third: None,
        first_is_length: Some(first_is_length),
        count: None,
    })
}

fn extract_labeled_lw(caps: &Captures, unit: UnitSystem) -> Option<RawDims> {
    extract_labeled(caps, unit, true)
}

fn extract_labeled_wl(caps: &Captures, unit: UnitSystem) -> Option<RawDims> {
    extract_labeled(caps, unit, false)
}

fn extract_triple(caps: &Captures, unit: UnitSystem) -> Option<RawDims> {
    let f = unit.to_mm_factor();
    let third = capture_number(caps, 3)? * f;
    if !in_thickness_range(third) {
        return None;
    }
    Some(RawDims {
        first: capture_number(caps, 1)? * f,
        second: capture_number(caps, 2)? * f,
        third: Some(third),
        first_is_length: None,
        count: None,
    })
}

/// `count x L x W`: the count is a whole number smaller than both dimensions.
fn extract_counted(caps: &Captures, unit: UnitSystem) -> Option<RawDims> {
    let count = caps.get(2)?.as_str().parse::<u64>().ok()?;
    let first = capture_number(caps, 3)?;
    let second = capture_number(caps, 4)?;
    if count == 0 || count > MAX_TEXT_QTY || count as f64 >= first.min(second) {
        return None;
    }
    let f = unit.to_mm_factor();
    Some(RawDims {
        first: first * f,
        second: second * f,
        third: None,
        first_is_length: None,
        count: Some(count),
    })
}

fn extract_unit_suffixed(caps: &Captures, unit: UnitSystem) -> Option<RawDims> {
    let unit = caps
        .get(2)
        .and_then(|m| UnitSystem::from_suffix(m.as_str()))
        .unwrap_or(unit);
    let f = unit.to_mm_factor();
    Some(RawDims {
        first: capture_number(caps, 1)? * f,
        second: capture_number(caps, 3)? * f,
        third: None,
        first_is_length: None,
        count: None,
    })
}

fn extract_pair(caps: &Captures, unit: UnitSystem) -> Option<RawDims> {
    let f = unit.to_mm_factor();
    Some(RawDims {
        first: capture_number(caps, 1)? * f,
        second: capture_number(caps, 2)? * f,
        third: None,
        first_is_length: None,
        count: None,
    })
}

static DIMENSION_LADDER: LazyLock<Vec<DimensionPattern>> = LazyLock::new(|| {
    vec![
        DimensionPattern::new(
            "labeled_lw",
            r"(?i)\b(?:l|len|length)\s*[:=]\s*(\d+(?:\.\d+)?)\s*(?:mm)?\s*[,;/]?\s*(?:w|wid|width)\s*[:=]\s*(\d+(?:\.\d+)?)",
            1.0,
            extract_labeled_lw,
        ),
        DimensionPattern::new(
            "labeled_wl",
            r"(?i)\b(?:w|wid|width)\s*[:=]\s*(\d+(?:\.\d+)?)\s*(?:mm)?\s*[,;/]?\s*(?:l|len|length)\s*[:=]\s*(\d+(?:\.\d+)?)",
            1.0,
            extract_labeled_wl,
        ),
        DimensionPattern::new(
            "triple",
            r"(?i)(\d+(?:\.\d+)?)[x×*](\d+(?:\.\d+)?)[x×*](\d+(?:\.\d+)?)(?:\s*mm\b)?",
            0.98,
            extract_triple,
        ),
        DimensionPattern::new(
            "counted",
            r"(?:^|[^\d.])(?P<span>(\d+)\s*[xX×*]\s*(\d+(?:\.\d+)?)\s*[xX×*]\s*(\d+(?:\.\d+)?))",
            0.97,
            extract_counted,
        ),
        DimensionPattern::new(
            "unit_suffixed",
            r#"(?i)(\d+(?:\.\d+)?)\s*(mm|cm|inch|in|")\s*(?:x|×|\*|by)\s*(\d+(?:\.\d+)?)\s*(?:mm|cm|inch|in|")?"#,
            1.0,
            extract_unit_suffixed,
        ),
        DimensionPattern::new(
            "nxn",
            r"(\d+(?:\.\d+)?)\s*[xX×*]\s*(\d+(?:\.\d+)?)",
            0.98,
            extract_pair,
        ),
        DimensionPattern::new(
            "by",
            r"(?i)(\d+(?:\.\d+)?)\s+by\s+(\d+(?:\.\d+)?)",
            0.97,
            extract_pair,
        ),
    ]
});

struct DimensionHit {
    pattern: &'static str,
    dims: RawDims,
    span: Range<usize>,
    confidence: f64,
}

fn find_dimensions(text: &str, unit: UnitSystem) -> Option<DimensionHit> {
    for pattern in DIMENSION_LADDER.iter() {
        for caps in pattern.regex.captures_iter(text) {
            if let Some(dims) = (pattern.extract)(&caps, unit) {
                let span = caps
                    .name("span")
                    .or_else(|| caps.get(0))
                    .map(|m| m.range())
                    .unwrap_or(0..0);
                return Some(DimensionHit {
                    pattern: pattern.name,
                    dims,
                    span,
                    confidence: pattern.confidence,
                });
            }
        }
    }
    None
}

fn orient(dims: &RawDims, order: DimOrder) -> (f64, f64) {
    match (dims.first_is_length, order) {
        (Some(true), _) | (None, DimOrder::LxW) => (dims.first, dims.second),
        (Some(false), _) | (None, DimOrder::WxL) => (dims.second, dims.first),
        (None, DimOrder::Infer) => {
            if dims.first >= dims.second {
                (dims.first, dims.second)
            } else {
                (dims.second, dims.first)
            }
        }
    }
}

// ==========================================
// Quantity ladder
// ==========================================

static QUANTITY_LADDER: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("explicit", r"(?i)\b(?:qty|quantity|qnty|count)\s*[:=#]?\s*(\d+)\b"),
        ("trailing_x", r"(?i)(?:^|\s)[x×]\s*(\d+)\b"),
        ("pieces", r"(?i)\b(\d+)\s*(?:pcs|pc|pieces|piece|off)\b"),
        ("leading_nx", r"(?i)^\s*(\d+)\s*[x×](?:\s|$)"),
        ("q_prefix", r"(?i)\bq\s*(\d+)\b"),
    ]
    .into_iter()
    .map(|(name, p)| (name, Regex::new(p).expect("quantity pattern")))
    .collect()
});

struct QuantityHit {
    value: u64,
    span: Range<usize>,
}

fn find_quantity(text: &str) -> Option<QuantityHit> {
    QUANTITY_LADDER.iter().find_map(|(name, regex)| {
        let caps = regex.captures(text)?;
        let value = caps
            .get(1)?
            .as_str()
            .parse::<u64>()
            .unwrap_or(u64::MAX);
        debug!(pattern = name, value, "quantity matched");
        Some(QuantityHit {
            value,
            span: caps.get(0)?.range(),
        })
    })
}

// ==========================================
// Grain / rotation ladder
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GrainDirective {
    Free,
    AlongL,
    AlongW,
}

static GRAIN_LADDER: LazyLock<Vec<(Regex, GrainDirective)>> = LazyLock::new(|| {
    [
        // negatives first: "no grain" contains "grain"
        (r"(?i)\bno\s*grain\b", GrainDirective::Free),
        (r"(?i)\bgrain\s*[:=]?\s*(?:none|n/?a)\b", GrainDirective::Free),
        (r"(?i)\bcan\s*rotate\b", GrainDirective::Free),
        (r"(?i)\bfree\s*rotat(?:e|ion)\b", GrainDirective::Free),
        (r"(?i)\brotat(?:e|ion)\s*(?:ok|allowed|yes)\b", GrainDirective::Free),
        (r"(?i)\bgrain\s*(?:along|with|on)?\s*(?:the\s*)?(?:width|w)\b", GrainDirective::AlongW),
        (r"(?i)\bgw\b", GrainDirective::AlongW),
        (r"(?i)\bgrain\s*(?:along|with|on)?\s*(?:the\s*)?(?:length|l)\b", GrainDirective::AlongL),
        (r"(?i)\bgl\b", GrainDirective::AlongL),
        (r"(?i)\bno\s*rotat(?:e|ion)\b", GrainDirective::AlongL),
        (r"(?i)\bfixed\b", GrainDirective::AlongL),
        (r"(?i)\bgrain(?:ed)?\b", GrainDirective::AlongL),
    ]
    .into_iter()
    .map(|(p, d)| (Regex::new(p).expect("grain pattern"), d))
    .collect()
});

fn find_grain(text: &str) -> Option<GrainDirective> {
    GRAIN_LADDER
        .iter()
        .find(|(regex, _)| regex.is_match(text))
        .map(|(_, directive)| *directive)
}

// ==========================================
// Label
// ==========================================

/// Word run closed by a colon or dash; only looked for in front of the dimensions.
static LEADING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\p{L}[\p{L}\s'&/.]*?)\s*[:\-–]").expect("label pattern")
});

static QUOTED_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["“”]([^"“”]+)["“”]"#).expect("quoted label pattern"));

fn find_label(raw: &str, dims_start: usize) -> Option<String> {
    [(&*LEADING_LABEL, &raw[..dims_start]), (&*QUOTED_LABEL, raw)]
        .iter()
        .filter_map(|(regex, text)| regex.captures(text))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .find(|label| !label.is_empty())
}

// ==========================================
// Material hints / thickness
// ==========================================

static THICKNESS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)mm$").expect("thickness token pattern"));

static SPACED_MM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s+mm\b").expect("spaced mm pattern"));

static THICKNESS_LADDER: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\b(?:t|thk|thick|thickness)\s*[:=]?\s*(\d+(?:\.\d+)?)",
        r"(?i)(\d+(?:\.\d+)?)\s*mm\b",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("thickness pattern"))
    .collect()
});

fn in_thickness_range(value: f64) -> bool {
    value >= THICKNESS_RANGE_MM.0 && value <= THICKNESS_RANGE_MM.1
}

/// Tags (material words and thickness tokens, in order) and the material hint text.
fn find_material_hints(text: &str) -> (Vec<String>, Option<String>) {
    let mut tags: Vec<String> = Vec::new();
    let mut hints: Vec<String> = Vec::new();
    // "18 mm" tags the same as "18mm"
    let text = SPACED_MM.replace_all(text, "${1}mm");

    for token in text.split_whitespace() {
        let token = token
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if token.is_empty() {
            continue;
        }

        let is_material =
            MATERIAL_KEYWORDS.contains(&token.as_str()) || COLOR_KEYWORDS.contains(&token.as_str());
        let is_thickness = THICKNESS_TOKEN
            .captures(&token)
            .and_then(|c| c.get(1)?.as_str().parse::<f64>().ok())
            .is_some_and(in_thickness_range);

        if (is_material || is_thickness) && !tags.contains(&token) {
            if is_material {
                hints.push(token.clone());
            }
            tags.push(token);
        }
    }

    let hint = if hints.is_empty() {
        None
    } else {
        Some(hints.join(" "))
    };
    (tags, hint)
}

fn find_thickness(text: &str) -> Option<f64> {
    THICKNESS_LADDER.iter().find_map(|regex| {
        regex
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<f64>().ok())
            .find(|v| in_thickness_range(*v))
    })
}

// ==========================================
// Edge codes
// ==========================================

static EDGE_CHAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[lw][12])+$").expect("edge chain pattern"));

static EDGE_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[12][lw])+$").expect("edge count pattern"));

static ALL_EDGES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:all|4|four)\s*(?:edges?|sides?)\b|\b(?:eb|edge)\s*all\b")
        .expect("all edges pattern")
});

/// Edge identifiers mentioned in `text`.
///
/// Accepts chained codes ("L1L2", "w1"), counted codes ("2L", "2L1W")
/// and "all edges" / "4 sides".
pub fn parse_edge_codes(text: &str) -> BTreeSet<EdgeId> {
    let mut edges = BTreeSet::new();

    if ALL_EDGES.is_match(text) {
        edges.extend(EdgeId::ALL);
        return edges;
    }

    for token in text.split(|c: char| !c.is_alphanumeric()) {
        let token = token.to_lowercase();
        if token.is_empty() {
            continue;
        }
        let chars: Vec<char> = token.chars().collect();

        if EDGE_CHAIN.is_match(&token) {
            for pair in chars.chunks(2) {
                let code: String = pair.iter().collect();
                if let Some(edge) = EdgeId::from_code(&code) {
                    edges.insert(edge);
                }
            }
        } else if EDGE_COUNT.is_match(&token) {
            for pair in chars.chunks(2) {
                let counted: &[EdgeId] = match (pair[0], pair[1]) {
                    ('1', 'l') => &[EdgeId::L1],
                    ('2', 'l') => &[EdgeId::L1, EdgeId::L2],
                    ('1', 'w') => &[EdgeId::W1],
                    ('2', 'w') => &[EdgeId::W1, EdgeId::W2],
                    _ => &[],
                };
                edges.extend(counted.iter().copied());
            }
        }
    }

    edges
}

// ==========================================
// Entry points
// ==========================================

/// Replace a byte span with spaces so later stages don't see it again.
fn blank(text: &mut String, span: Range<usize>) {
    let filler = " ".repeat(span.len());
    text.replace_range(span, &filler);
}

/// Parse one line of free text.
pub fn parse_line(line: &str, opts: &TextParseOptions) -> TextParseResult {
    parse_line_at(line, 1, opts)
}

fn parse_line_at(line: &str, line_number: usize, opts: &TextParseOptions) -> TextParseResult {
    let raw = line.trim().to_string();

    // === stage 1: dimensions (fatal) ===
    let Some(hit) = find_dimensions(&raw, opts.units) else {
        debug!(line_number, "no dimensions found");
        return TextParseResult::failed(
            line_number,
            raw,
            "no dimensions found (expected e.g. 720x560 or L:720 W:560)",
        );
    };
    let (length, width) = orient(&hit.dims, opts.dim_order);
    let mut confidence = hit.confidence;
    let mut warnings = Vec::new();

    let mut rest = raw.clone();
    blank(&mut rest, hit.span.clone());

    // === stage 2: quantity ===
    let counted = hit.dims.count.map(|value| QuantityHit { value, span: 0..0 });
    let qty = match counted.or_else(|| find_quantity(&rest)) {
        Some(q) => {
            blank(&mut rest, q.span);
            if q.value == 0 || q.value > MAX_TEXT_QTY {
                warnings.push(format!(
                    "quantity {} outside 1..={}, defaulted to 1",
                    q.value, MAX_TEXT_QTY
                ));
                confidence *= QTY_REJECTED_FACTOR;
                1
            } else {
                q.value as u32
            }
        }
        None => {
            confidence *= QTY_DEFAULT_FACTOR;
            1
        }
    };

    // === stage 3: grain / rotation ===
    let grain = find_grain(&rest).unwrap_or_else(|| {
        confidence *= GRAIN_DEFAULT_FACTOR;
        GrainDirective::Free
    });

    // === stages 4-7 ===
    let label = find_label(&raw, hit.span.start);
    let (tags, material_hint) = find_material_hints(&rest);
    let thickness_mm = find_thickness(&rest)
        .or(hit.dims.third)
        .unwrap_or(opts.default_thickness_mm);
    let edges = parse_edge_codes(&rest);

    let mut audit = PartAudit::new(opts.source_method, Some(raw.clone()), confidence);
    audit.warnings = warnings.clone();

    let material_id = opts
        .default_material_id
        .clone()
        .unwrap_or_else(|| DEFAULT_MATERIAL_ID.to_string());
    let mut part = CutPart::draft(PartSize::new(length, width), thickness_mm, material_id, audit);
    part.qty = qty;
    part.label = label;
    part.tags = tags;
    part.material_hint = material_hint;
    part.set_grain(match grain {
        GrainDirective::Free => Grain::None,
        GrainDirective::AlongL => Grain::AlongL,
        GrainDirective::AlongW => Grain::AlongW,
    });
    if !edges.is_empty() {
        let edging = part.edging_mut();
        for edge in edges {
            edging.edges.insert(edge, EdgeSpec::pending());
        }
    }

    debug!(
        line_number,
        pattern = hit.pattern,
        length,
        width,
        qty,
        confidence = part.audit.confidence,
        "line parsed"
    );

    TextParseResult {
        line_number,
        raw,
        confidence: part.audit.confidence,
        part: Some(part),
        errors: Vec::new(),
        warnings,
    }
}

/// Split a block on newline / semicolon / pipe and parse each non-empty line.
#[instrument(skip(text, opts), fields(len = text.len()))]
pub fn parse_text_batch(text: &str, opts: &TextParseOptions) -> TextBatchResult {
    let results: Vec<TextParseResult> = text
        .split(['\n', '\r', ';', '|'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| parse_line_at(line, idx + 1, opts))
        .collect();

    let stats = ParseStats::collect(results.iter().map(|r| (r.part.is_some(), r.confidence)));
    info!(
        total = stats.total,
        parsed = stats.parsed,
        errors = stats.errors,
        avg_confidence = stats.avg_confidence,
        "text batch parsed"
    );

    TextBatchResult { results, stats }
}

/// Single-field entry: the part only when it reaches `opts.min_confidence` error-free.
pub fn quick_parse(text: &str, opts: &TextParseOptions) -> Option<CutPart> {
    let result = parse_line(text, opts);
    if !result.errors.is_empty() || result.confidence < opts.min_confidence {
        return None;
    }
    result.part
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> TextParseOptions {
        TextParseOptions::default()
    }

    fn part_of(line: &str) -> (CutPart, f64) {
        let result = parse_line(line, &opts());
        let confidence = result.confidence;
        (result.part.expect("part"), confidence)
    }

    #[test]
    fn test_dimension_patterns_agree() {
        for line in ["720x560", "720 x 560", "720mm x 560mm", "L:720 W:560"] {
            let (part, confidence) = part_of(line);
            assert_eq!(part.size.l, 720.0, "{}", line);
            assert_eq!(part.size.w, 560.0, "{}", line);
            assert!(confidence >= 0.9, "{} -> {}", line, confidence);
        }
    }

    #[test]
    fn test_dimension_by_and_labeled_reverse() {
        let (part, _) = part_of("600 by 400");
        assert_eq!((part.size.l, part.size.w), (600.0, 400.0));

        let (part, _) = part_of("W:300 L:900");
        assert_eq!((part.size.l, part.size.w), (900.0, 300.0));
    }

    #[test]
    fn test_missing_dimensions_is_fatal() {
        let result = parse_line("white shelf qty 2", &opts());
        assert!(result.part.is_none());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_dim_order_policies() {
        let mut o = opts();
        o.dim_order = DimOrder::LxW;
        let part = parse_line("400x600", &o).part.unwrap();
        assert_eq!((part.size.l, part.size.w), (400.0, 600.0));

        o.dim_order = DimOrder::WxL;
        let part = parse_line("400x600", &o).part.unwrap();
        assert_eq!((part.size.l, part.size.w), (600.0, 400.0));

        o.dim_order = DimOrder::Infer;
        let part = parse_line("400x600", &o).part.unwrap();
        assert_eq!((part.size.l, part.size.w), (600.0, 400.0));
    }

    #[test]
    fn test_units_conversion() {
        let mut o = opts();
        o.units = UnitSystem::Cm;
        let part = parse_line("72 x 56", &o).part.unwrap();
        assert_eq!((part.size.l, part.size.w), (720.0, 560.0));

        // explicit suffix overrides configured unit
        let part = parse_line("10in x 5in", &opts()).part.unwrap();
        assert!((part.size.l - 254.0).abs() < 1e-9);
        assert!((part.size.w - 127.0).abs() < 1e-9);
    }

    #[test]
    fn test_triple_carries_thickness() {
        let (part, _) = part_of("800x400x18");
        assert_eq!((part.size.l, part.size.w), (800.0, 400.0));
        assert_eq!(part.thickness_mm, 18.0);
    }

    #[test]
    fn test_quantity_default_lowers_confidence() {
        let (without, c_without) = part_of("720x560 white");
        let (with, c_with) = part_of("720x560 white qty 3");
        assert_eq!(without.qty, 1);
        assert_eq!(with.qty, 3);
        assert!(c_without < c_with);
    }

    #[test]
    fn test_quantity_ladder_variants() {
        assert_eq!(part_of("720x560 x4").0.qty, 4);
        assert_eq!(part_of("720x560 5 pcs").0.qty, 5);
        assert_eq!(part_of("3x 720x560").0.qty, 3);
        assert_eq!(part_of("720x560 q7").0.qty, 7);
        assert_eq!(part_of("720x560 qty: 12").0.qty, 12);
    }

    #[test]
    fn test_quantity_out_of_range_defaults() {
        let result = parse_line("720x560 qty 5000", &opts());
        let part = result.part.unwrap();
        assert_eq!(part.qty, 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_grain_patterns() {
        let (part, _) = part_of("720x560 grain along length");
        assert_eq!(part.grain, Grain::AlongL);
        assert!(!part.allow_rotation);

        let (part, _) = part_of("720x560 no grain");
        assert_eq!(part.grain, Grain::None);
        assert!(part.allow_rotation);

        let (part, _) = part_of("720x560 no rotation");
        assert_eq!(part.grain, Grain::AlongL);
        assert!(!part.allow_rotation);

        let (part, _) = part_of("720x560 can rotate");
        assert!(part.allow_rotation);

        let (part, _) = part_of("720x560 GW");
        assert_eq!(part.grain, Grain::AlongW);
    }

    #[test]
    fn test_grain_absence_is_mild() {
        let (_, without) = part_of("720x560 GL qty 2");
        let (_, with) = part_of("720x560 qty 2");
        assert!(with < without);
        assert!(with > 0.95);
    }

    #[test]
    fn test_labels() {
        assert_eq!(part_of("Door - 700x400").0.label.as_deref(), Some("Door"));
        assert_eq!(
            part_of("720x560 \"Top shelf\"").0.label.as_deref(),
            Some("Top shelf")
        );
        assert_eq!(part_of("L:720 W:560").0.label, None);
    }

    #[test]
    fn test_thickness_range() {
        assert_eq!(part_of("720x560 25mm").0.thickness_mm, 25.0);
        assert_eq!(part_of("720x560 t=16").0.thickness_mm, 16.0);
        // 200mm is not a plausible thickness
        assert_eq!(part_of("720x560 200mm").0.thickness_mm, 18.0);
    }

    #[test]
    fn test_edge_codes() {
        let edges = parse_edge_codes("L1L2 w1");
        assert_eq!(
            edges.into_iter().collect::<Vec<_>>(),
            vec![EdgeId::L1, EdgeId::L2, EdgeId::W1]
        );
        assert_eq!(parse_edge_codes("all edges").len(), 4);
        assert_eq!(parse_edge_codes("2L1W").len(), 3);
        assert!(parse_edge_codes("panel").is_empty());
    }

    #[test]
    fn test_end_to_end_line() {
        let result = parse_line("Side panel: 720x560 x2 GL white 18mm L1L2", &opts());
        let part = result.part.expect("part");

        assert_eq!(part.label.as_deref(), Some("Side panel"));
        assert_eq!((part.size.l, part.size.w), (720.0, 560.0));
        assert_eq!(part.qty, 2);
        assert_eq!(part.thickness_mm, 18.0);
        assert_eq!(part.grain, Grain::AlongL);
        assert!(!part.allow_rotation);
        assert_eq!(part.tags, vec!["white".to_string(), "18mm".to_string()]);
        assert_eq!(part.material_hint.as_deref(), Some("white"));

        let edging = part.edging().expect("edging");
        assert_eq!(edging.edges.len(), 2);
        assert!(edging.edges[&EdgeId::L1].apply);
        assert!(edging.edges[&EdgeId::L2].apply);
        assert!(result.confidence > 0.7);
    }

    #[test]
    fn test_batch_splits_and_isolates() {
        let batch = parse_text_batch("720x560 x2; nonsense | 400x300\n\n", &opts());
        assert_eq!(batch.stats.total, 3);
        assert_eq!(batch.stats.parsed, 2);
        assert_eq!(batch.stats.errors, 1);
        assert_eq!(batch.results[1].line_number, 2);
        assert!(batch.results[1].part.is_none());
        assert!(batch.results[2].part.is_some());
        assert!(batch.stats.avg_confidence > 0.0 && batch.stats.avg_confidence < 1.0);
    }

    #[test]
    fn test_quick_parse_threshold() {
        let mut o = opts();
        o.min_confidence = 0.5;
        assert!(quick_parse("720x560", &o).is_some());
        o.min_confidence = 0.99;
        assert!(quick_parse("720x560", &o).is_none());
        o.min_confidence = 0.0;
        assert!(quick_parse("no numbers", &o).is_none());
        // default threshold (0.6) lets a plain line through
        assert!(quick_parse("720x560", &opts()).is_some());
    }

    #[test]
    fn test_leading_count_forms() {
        for line in ["2x720x560", "2 x 720x560", "2X 720x560", "2 x 720 x 560"] {
            let (part, _) = part_of(line);
            assert_eq!((part.size.l, part.size.w, part.qty), (720.0, 560.0, 2), "{}", line);
        }

        let (part, confidence) = part_of("10 x 720x560 white melamine");
        assert_eq!((part.size.l, part.size.w, part.qty), (720.0, 560.0, 10));
        assert!(confidence < 0.97);

        // a plausible third value is still a thickness, a trailing xN still a count
        let (part, _) = part_of("800x400x18");
        assert_eq!((part.size.l, part.size.w, part.qty), (800.0, 400.0, 1));
        assert_eq!(part.thickness_mm, 18.0);
        let (part, _) = part_of("720x560 x2");
        assert_eq!((part.size.l, part.size.w, part.qty), (720.0, 560.0, 2));
    }

    #[test]
    fn test_label_only_before_dimensions() {
        assert_eq!(part_of("Top 600x300 - oak veneer").0.label, None);
        assert_eq!(part_of("white 720x560 GL - shelf").0.label, None);
        assert_eq!(
            part_of("Shelf: 2x720x560").0.label.as_deref(),
            Some("Shelf")
        );
    }

    #[test]
    fn test_spaced_thickness_is_tagged() {
        let (part, _) = part_of("720x560 white 18 mm");
        assert_eq!(part.thickness_mm, 18.0);
        assert_eq!(part.tags, vec!["white".to_string(), "18mm".to_string()]);
    }
}
