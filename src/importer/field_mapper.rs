// ==========================================
// Cutlist Intake - Column Mapper
// ==========================================
// Scope: spreadsheet column → CutPart field mapping
// Explicit mapping: by index or by header name (case-insensitive)
// Auto-detect: each field owns ordered header patterns, headers scanned left to right
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::text_normalizer::{clean_cell, normalize_text};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Part fields that a spreadsheet column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartField {
    PartId,
    Label,
    Length,
    Width,
    Quantity,
    Thickness,
    Material,
    Grain,
    /// Combined edge column ("L1L2", "all", "2L1W", truthy)
    Edging,
    EdgeL1,
    EdgeL2,
    EdgeW1,
    EdgeW2,
    Group,
    Notes,
}

impl fmt::Display for PartField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PartField::PartId => "part_id",
            PartField::Label => "label",
            PartField::Length => "length",
            PartField::Width => "width",
            PartField::Quantity => "quantity",
            PartField::Thickness => "thickness",
            PartField::Material => "material",
            PartField::Grain => "grain",
            PartField::Edging => "edging",
            PartField::EdgeL1 => "edge_l1",
            PartField::EdgeL2 => "edge_l2",
            PartField::EdgeW1 => "edge_w1",
            PartField::EdgeW2 => "edge_w2",
            PartField::Group => "group",
            PartField::Notes => "notes",
        };
        write!(f, "{}", s)
    }
}

/// A column reference: zero-based index or header text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Header(String),
}

// ==========================================
// ColumnMapping
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub columns: BTreeMap<PartField, ColumnRef>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: PartField, column: ColumnRef) -> Self {
        self.columns.insert(field, column);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Resolve header references against the header row.
    ///
    /// # Errors
    /// - `ColumnMappingError` when a header name is not present
    pub fn resolve(&self, headers: &[String]) -> ImportResult<ResolvedMapping> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_text(h)).collect();
        let mut columns = BTreeMap::new();

        for (field, column) in &self.columns {
            let idx = match column {
                ColumnRef::Index(idx) => *idx,
                ColumnRef::Header(name) => {
                    let wanted = normalize_text(name);
                    normalized.iter().position(|h| *h == wanted).ok_or_else(|| {
                        ImportError::ColumnMappingError(format!(
                            "header '{}' for field {} not found",
                            name, field
                        ))
                    })?
                }
            };
            columns.insert(*field, idx);
        }

        Ok(ResolvedMapping { columns })
    }
}

/// Mapping with every column reduced to an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMapping {
    pub columns: BTreeMap<PartField, usize>,
}

impl ResolvedMapping {
    pub fn has(&self, field: PartField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Trimmed, non-blank cell for `field` in `row` (ragged rows give None).
    pub fn cell<'a>(&self, row: &'a [String], field: PartField) -> Option<&'a str> {
        let idx = *self.columns.get(&field)?;
        row.get(idx).and_then(|v| clean_cell(v))
    }
}

// ==========================================
// Auto-detection
// ==========================================

/// Field priority and header patterns (matched against normalized header text).
/// Per-edge fields come before length/width so "L1" is not read as a length column.
static FIELD_PATTERNS: LazyLock<Vec<(PartField, Vec<Regex>)>> = LazyLock::new(|| {
    let table: Vec<(PartField, &[&str])> = vec![
        (
            PartField::PartId,
            &[r"^(?:part\s*)?id$", r"^part\s*(?:no|number|code)$", r"^item\s*(?:id|no)$"],
        ),
        (PartField::EdgeL1, &[r"^(?:(?:edge|eb|band)\s*)?l1$"]),
        (PartField::EdgeL2, &[r"^(?:(?:edge|eb|band)\s*)?l2$"]),
        (PartField::EdgeW1, &[r"^(?:(?:edge|eb|band)\s*)?w1$"]),
        (PartField::EdgeW2, &[r"^(?:(?:edge|eb|band)\s*)?w2$"]),
        (
            PartField::Edging,
            &[r"^(?:edg(?:e|es|ing)|edgeband(?:ing)?|banding|eb)\b", r"\bedge\s*band"],
        ),
        (PartField::Length, &[r"^(?:length|len|l|long|height|h)\b", r"\blength\b"]),
        (PartField::Width, &[r"^(?:width|wid|w|wide|depth)\b", r"\bwidth\b"]),
        (PartField::Thickness, &[r"^(?:thickness|thick|thk|t)\b", r"\bthickness\b"]),
        (
            PartField::Quantity,
            &[r"^(?:qty|quantity|qnty|count|pcs|pieces|amount|no|num)\b", r"\b(?:qty|quantity)\b"],
        ),
        (
            PartField::Material,
            &[r"^(?:material|mat|board|sheet|substrate|decor|finish)\b", r"\bmaterial\b"],
        ),
        (PartField::Grain, &[r"^(?:grain|rotation|rotate|direction)\b", r"\bgrain\b"]),
        (
            PartField::Label,
            &[r"^(?:label|name|part|description|desc|item|component)\b"],
        ),
        (PartField::Group, &[r"^(?:group|cabinet|unit|assembly|section)\b"]),
        (PartField::Notes, &[r"^(?:notes?|comments?|remarks?)\b"]),
    ];

    table
        .into_iter()
        .map(|(field, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(p).expect("header pattern"))
                .collect();
            (field, compiled)
        })
        .collect()
});

/// Field recognized for a single header, ignoring fields in `taken`.
fn detect_field(header: &str, taken: &BTreeMap<PartField, ColumnRef>) -> Option<PartField> {
    let normalized = normalize_text(header);
    if normalized.is_empty() {
        return None;
    }
    FIELD_PATTERNS
        .iter()
        .filter(|(field, _)| !taken.contains_key(field))
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(&normalized)))
        .map(|(field, _)| *field)
}

/// Build a mapping from a header row.
///
/// Headers are scanned left to right; a header feeds at most one field and
/// the first header matching a field wins it.
pub fn auto_detect_mapping(headers: &[String]) -> ColumnMapping {
    let mut columns = BTreeMap::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(field) = detect_field(header, &columns) {
            columns.insert(field, ColumnRef::Index(idx));
        }
    }
    ColumnMapping { columns }
}
