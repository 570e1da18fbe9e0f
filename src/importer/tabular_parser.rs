// ==========================================
// Cutlist Intake - Tabular Parser
// ==========================================
// Scope: string grid (pasted cells, CSV, worksheet) → one result per non-empty row
// Mapping: explicit (TabularParseOptions.mapping) or auto-detected from the header row
// Row errors are isolated: a bad row never stops the grid
// ==========================================

use crate::config::parse_options::TabularParseOptions;
use crate::domain::part::{CutPart, EdgeSpec, PartAudit, PartSize, DEFAULT_MATERIAL_ID};
use crate::domain::types::{EdgeId, Grain};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{auto_detect_mapping, PartField, ResolvedMapping};
use crate::importer::text_normalizer::{is_truthy, normalize_text, parse_number};
use crate::importer::text_parser::{parse_edge_codes, ParseStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

const QTY_DEFAULT_FACTOR: f64 = 0.9;
const THICKNESS_DEFAULT_FACTOR: f64 = 0.95;

/// Result for one data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowParseResult {
    /// Zero-based index into the grid
    pub row_index: usize,
    pub part: Option<CutPart>,
    pub confidence: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabularParseResult {
    /// Mapping actually applied (explicit or detected)
    pub mapping: ResolvedMapping,
    pub results: Vec<RowParseResult>,
    pub stats: ParseStats,
}

impl TabularParseResult {
    pub fn parts(&self) -> impl Iterator<Item = &CutPart> {
        self.results.iter().filter_map(|r| r.part.as_ref())
    }
}

// ==========================================
// Cell interpretation
// ==========================================

/// Grain cell: "L"/"length"/"GL"/truthy → along_L, "W"/"width"/"GW" → along_W.
fn parse_grain_cell(value: &str) -> Grain {
    let normalized = normalize_text(value);
    match normalized.as_str() {
        "w" | "width" | "gw" | "along w" | "along width" => Grain::AlongW,
        "l" | "length" | "gl" | "along l" | "along length" | "fixed" => Grain::AlongL,
        _ if is_truthy(value) => Grain::AlongL,
        _ => Grain::None,
    }
}

/// Combined edging cell: truthy / "all" → every edge, otherwise edge codes.
fn parse_edging_cell(value: &str) -> BTreeSet<EdgeId> {
    let normalized = normalize_text(value);
    if is_truthy(value) || normalized == "all" || normalized == "4" {
        return EdgeId::ALL.into_iter().collect();
    }
    parse_edge_codes(value)
}

fn row_is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

// ==========================================
// Row parsing
// ==========================================

fn parse_row(
    row: &[String],
    row_index: usize,
    mapping: &ResolvedMapping,
    opts: &TabularParseOptions,
) -> RowParseResult {
    let factor = opts.units.to_mm_factor();
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut confidence: f64 = 1.0;

    // === required dimensions ===
    let length = mapping
        .cell(row, PartField::Length)
        .and_then(parse_number)
        .filter(|v| *v > 0.0);
    let width = mapping
        .cell(row, PartField::Width)
        .and_then(parse_number)
        .filter(|v| *v > 0.0);
    if length.is_none() {
        errors.push("missing or invalid length".to_string());
    }
    if width.is_none() {
        errors.push("missing or invalid width".to_string());
    }
    let (Some(length), Some(width)) = (length, width) else {
        return RowParseResult {
            row_index,
            part: None,
            confidence: 0.0,
            errors,
            warnings,
        };
    };

    // === quantity ===
    let qty = match mapping.cell(row, PartField::Quantity) {
        None => {
            warnings.push("quantity missing, defaulted to 1".to_string());
            confidence *= QTY_DEFAULT_FACTOR;
            1
        }
        Some(cell) => match parse_number(cell).filter(|v| *v >= 1.0 && v.fract() == 0.0) {
            Some(v) if v <= u32::MAX as f64 => v as u32,
            _ => {
                warnings.push(format!("invalid quantity '{}', defaulted to 1", cell));
                confidence *= QTY_DEFAULT_FACTOR;
                1
            }
        },
    };

    // === thickness ===
    let thickness_mm = match mapping
        .cell(row, PartField::Thickness)
        .and_then(parse_number)
        .filter(|v| *v > 0.0)
    {
        Some(t) => t,
        None => {
            confidence *= THICKNESS_DEFAULT_FACTOR;
            opts.default_thickness_mm
        }
    };

    let material_id = opts
        .default_material_id
        .clone()
        .unwrap_or_else(|| DEFAULT_MATERIAL_ID.to_string());

    let raw = row
        .iter()
        .map(|c| c.trim())
        .collect::<Vec<_>>()
        .join(" | ");
    let mut audit = PartAudit::new(opts.source_method, Some(raw), confidence);
    audit.warnings = warnings.clone();

    let mut part = CutPart::draft(
        PartSize::new(length * factor, width * factor),
        thickness_mm,
        material_id,
        audit,
    );
    part.qty = qty;
    part.material_hint = mapping.cell(row, PartField::Material).map(str::to_string);
    part.label = mapping.cell(row, PartField::Label).map(str::to_string);
    part.group_id = mapping.cell(row, PartField::Group).map(str::to_string);
    part.notes = mapping.cell(row, PartField::Notes).map(str::to_string);
    if let Some(id) = mapping.cell(row, PartField::PartId) {
        part.part_id = id.to_string();
    }
    if let Some(grain) = mapping.cell(row, PartField::Grain) {
        part.set_grain(parse_grain_cell(grain));
    }

    // === edging: combined column and/or per-edge columns ===
    let mut edges = mapping
        .cell(row, PartField::Edging)
        .map(parse_edging_cell)
        .unwrap_or_default();
    for (field, edge) in [
        (PartField::EdgeL1, EdgeId::L1),
        (PartField::EdgeL2, EdgeId::L2),
        (PartField::EdgeW1, EdgeId::W1),
        (PartField::EdgeW2, EdgeId::W2),
    ] {
        if mapping.cell(row, field).is_some_and(is_truthy) {
            edges.insert(edge);
        }
    }
    if !edges.is_empty() {
        let edging = part.edging_mut();
        for edge in edges {
            edging.edges.insert(edge, EdgeSpec::pending());
        }
    }

    RowParseResult {
        row_index,
        confidence: part.audit.confidence,
        part: Some(part),
        errors,
        warnings,
    }
}

// ==========================================
// Grid entry point
// ==========================================

/// Parse a grid into per-row results.
///
/// # Errors
/// - `HeaderRowOutOfRange` when the grid is non-empty and shorter than the header row
/// - `ColumnMappingError` when an explicit header is unknown or no length/width column exists
#[instrument(skip(grid, opts), fields(rows = grid.len()))]
pub fn parse_grid(grid: &[Vec<String>], opts: &TabularParseOptions) -> ImportResult<TabularParseResult> {
    if grid.is_empty() {
        return Ok(TabularParseResult {
            mapping: ResolvedMapping::default(),
            results: Vec::new(),
            stats: ParseStats::default(),
        });
    }

    let header_row = opts.header_row_index;
    let headers = grid.get(header_row).ok_or(ImportError::HeaderRowOutOfRange {
        header_row,
        rows: grid.len(),
    })?;

    let mapping = match &opts.mapping {
        Some(explicit) => explicit.resolve(headers)?,
        None => auto_detect_mapping(headers).resolve(headers)?,
    };
    if !mapping.has(PartField::Length) || !mapping.has(PartField::Width) {
        warn!(?headers, "no length/width columns");
        return Err(ImportError::ColumnMappingError(
            "no length and width columns found".to_string(),
        ));
    }
    debug!(mapping = ?mapping.columns, "column mapping resolved");

    let start = opts.first_data_row();
    let end = opts.data_row_end.unwrap_or(grid.len()).min(grid.len());

    let results: Vec<RowParseResult> = (start..end)
        .filter(|idx| !row_is_blank(&grid[*idx]))
        .map(|idx| parse_row(&grid[idx], idx, &mapping, opts))
        .collect();

    let stats = ParseStats::collect(results.iter().map(|r| (r.part.is_some(), r.confidence)));
    info!(
        total = stats.total,
        parsed = stats.parsed,
        errors = stats.errors,
        "grid parsed"
    );

    Ok(TabularParseResult {
        mapping,
        results,
        stats,
    })
}
