// ==========================================
// Cutlist Intake - Sheet Selector
// ==========================================
// Scope: pick the worksheet most likely to hold the parts list
// Score: name (+10 / -15), recognized headers (+5 each), row count (+3), column count (+2)
// Rule: highest score wins, ties keep the first sheet
// ==========================================

use crate::importer::field_mapper::{auto_detect_mapping, PartField};
use crate::importer::importer_trait::Sheet;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

const NAME_BONUS: i32 = 10;
const NAME_PENALTY: i32 = -15;
const HEADER_BONUS: i32 = 5;
const ROWS_BONUS: i32 = 3;
const COLUMNS_BONUS: i32 = 2;

/// Rows scanned for a header row.
const HEADER_SCAN_ROWS: usize = 10;

/// Header fields that count towards the score.
const SCORED_FIELDS: [PartField; 4] = [
    PartField::Length,
    PartField::Width,
    PartField::Quantity,
    PartField::Material,
];

static PARTS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:parts?|cut\s*-?\s*lists?|cutlists?|bom)\b").expect("parts name pattern")
});

static AUX_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:instructions?|notes?|reference|guide)\b").expect("aux name pattern")
});

/// Recognized scored header fields in the best of the first few rows.
fn header_hits(sheet: &Sheet) -> usize {
    sheet
        .rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .map(|row| {
            let mapping = auto_detect_mapping(row);
            SCORED_FIELDS
                .iter()
                .filter(|f| mapping.columns.contains_key(f))
                .count()
        })
        .max()
        .unwrap_or(0)
}

pub fn score_sheet(sheet: &Sheet) -> i32 {
    let mut score = 0;
    if PARTS_NAME.is_match(&sheet.name) {
        score += NAME_BONUS;
    }
    if AUX_NAME.is_match(&sheet.name) {
        score += NAME_PENALTY;
    }
    score += HEADER_BONUS * header_hits(sheet) as i32;
    if (5..=500).contains(&sheet.row_count()) {
        score += ROWS_BONUS;
    }
    if (4..=20).contains(&sheet.column_count()) {
        score += COLUMNS_BONUS;
    }
    score
}

/// Index of the best sheet, None for an empty workbook.
pub fn select_sheet(sheets: &[Sheet]) -> Option<usize> {
    let mut best: Option<(usize, i32)> = None;
    for (idx, sheet) in sheets.iter().enumerate() {
        let score = score_sheet(sheet);
        debug!(sheet = %sheet.name, score, "sheet scored");
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, rows: &[&[&str]]) -> Sheet {
        Sheet::new(
            name,
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_select_parts_sheet_by_name() {
        let sheets = vec![
            sheet("Project Info", &[&["Job", "Kitchen"]]),
            sheet("Parts List", &[&["Part", "Length", "Width", "Qty", "Material"]]),
            sheet("Materials Reference", &[&["Material", "Supplier"]]),
        ];
        assert_eq!(select_sheet(&sheets), Some(1));
        // name +10, 4 headers × 5, 5 columns +2
        assert_eq!(score_sheet(&sheets[1]), 32);
        // reference -15, material header +5
        assert_eq!(score_sheet(&sheets[2]), -10);
    }

    #[test]
    fn test_headers_outweigh_neutral_name() {
        let data: Vec<&[&str]> = vec![
            &["Name", "Length", "Width", "Qty", "Material"],
            &["Side", "720", "560", "2", "White"],
            &["Top", "800", "560", "1", "White"],
            &["Back", "800", "700", "1", "HDF"],
            &["Shelf", "764", "540", "3", "White"],
        ];
        let sheets = vec![sheet("Sheet1", &[&["Customer", "ACME"]]), sheet("Sheet2", &data)];
        assert_eq!(select_sheet(&sheets), Some(1));
        // 4 headers × 5 + rows 5 (+3) + cols 5 (+2)
        assert_eq!(score_sheet(&sheets[1]), 25);
    }

    #[test]
    fn test_ties_keep_first() {
        let sheets = vec![sheet("A", &[]), sheet("B", &[])];
        assert_eq!(select_sheet(&sheets), Some(0));
        assert_eq!(select_sheet(&[]), None);
    }

    #[test]
    fn test_penalty_names() {
        assert_eq!(score_sheet(&sheet("Instructions", &[])), -15);
        assert_eq!(score_sheet(&sheet("Cut List", &[])), 10);
        assert_eq!(score_sheet(&sheet("BOM", &[])), 10);
    }
}
