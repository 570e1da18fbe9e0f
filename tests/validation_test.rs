// ==========================================
// Validator integration tests
// ==========================================
// Target: parser output through part / cutlist validation
// ==========================================

use cutlist_intake::config::{CutlistValidationConfig, TextParseOptions};
use cutlist_intake::domain::{Cutlist, JobInfo, ValidationCode};
use cutlist_intake::engine::{quick_validate, CutlistValidator, PartValidator};
use cutlist_intake::importer::parse_text_batch;

fn parts_of(text: &str) -> Vec<cutlist_intake::CutPart> {
    parse_text_batch(text, &TextParseOptions::default())
        .results
        .into_iter()
        .filter_map(|r| r.part)
        .collect()
}

#[test]
fn test_oversized_and_rotation_required() {
    // grain fixes the orientation, so rotation is disabled
    let parts = parts_of("3000x2500 x1 GL\nL:2000 W:2500 GL\nL:2000 W:2500");
    let results = PartValidator::default().validate_parts(&parts);

    assert!(results[0].has_code(ValidationCode::OversizedPart));
    assert!(!results[0].valid);

    assert!(results[1].has_code(ValidationCode::RotationRequired));
    assert!(!results[1].valid);

    // same size, rotation allowed
    assert!(!results[2].has_code(ValidationCode::RotationRequired));
    assert!(results[2].valid);
}

#[test]
fn test_duplicate_ids_flag_both_parts() {
    let mut parts = parts_of("720x560 x2\n400x300 x1\n500x500 x1");
    parts[2].part_id = parts[0].part_id.clone();

    let results = PartValidator::default().validate_parts(&parts);
    assert!(results[0].has_code(ValidationCode::DuplicatePartId));
    assert!(results[2].has_code(ValidationCode::DuplicatePartId));
    assert!(!results[1].has_code(ValidationCode::DuplicatePartId));

    let quick = quick_validate(&parts);
    assert!(quick.valid);
    assert_eq!(quick.usable_parts, 3);
    assert_eq!(quick.duplicate_ids, vec![parts[0].part_id.clone()]);
}

#[test]
fn test_cutlist_report() {
    let mut cutlist = Cutlist::new("doc-42");
    cutlist.job = JobInfo {
        job_id: Some("J-42".to_string()),
        name: Some("Wardrobe".to_string()),
        client: Some("Smith".to_string()),
    };
    cutlist.parts = parts_of("Side: 2000x600 x2 18mm\nShelf: 964x580 x4 16mm\nTiny: 30x20 x1");
    for part in &mut cutlist.parts {
        part.material_id = "m-white".to_string();
    }

    let report = CutlistValidator::new(CutlistValidationConfig::default()).validate(&cutlist);

    assert!(report.valid);
    assert_eq!(report.summary.total_parts, 3);
    assert_eq!(report.summary.total_pieces, 7);
    assert_eq!(report.summary.materials_used, vec!["m-white"]);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.code == ValidationCode::MaterialThicknessConflict));
    assert!(report.part_results[2].has_code(ValidationCode::AreaTooSmall));
    assert!(!report
        .warnings
        .iter()
        .any(|w| w.code == ValidationCode::MissingJobId));
}

#[test]
fn test_report_serializes_wire_codes() {
    let parts = parts_of("3000x2500 x1");
    let mut cutlist = Cutlist::new("doc");
    cutlist.parts = parts;
    let report = CutlistValidator::default().validate(&cutlist);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["part_results"][0]["errors"][0]["code"], "OVERSIZED_PART");
    assert_eq!(json["part_results"][0]["errors"][0]["severity"], "error");
}
