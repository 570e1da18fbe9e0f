// ==========================================
// Test helpers
// ==========================================
// Scope: temp databases, catalog seeding, temp input files
// ==========================================

#![allow(dead_code)]

use cutlist_intake::config::ConfigManager;
use cutlist_intake::db::{init_schema, open_sqlite_connection};
use cutlist_intake::domain::{EdgebandDef, MaterialDef};
use cutlist_intake::repository::SqliteCatalogRepository;
use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

pub const TEST_ORG: &str = "org-test";

/// Create a temporary database with the schema applied.
///
/// # Returns
/// - NamedTempFile: keep alive for the duration of the test
/// - String: database path
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("non-utf8 temp path")?
        .to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// Sample catalog: three sheet materials, two edgebands.
pub fn sample_materials() -> Vec<MaterialDef> {
    let mut white = MaterialDef::new("m-white-18", "White Melamine", 18.0);
    white.sku = Some("WM-18".to_string());
    white.core_type = Some("particleboard".to_string());

    let mut oak = MaterialDef::new("m-oak-19", "Oak Veneer MDF", 19.0);
    oak.grained = true;
    oak.core_type = Some("mdf".to_string());

    let black = MaterialDef::new("m-black-22", "Black Gloss Acrylic", 22.0);

    vec![white, oak, black]
}

pub fn sample_edgebands() -> Vec<EdgebandDef> {
    vec![
        EdgebandDef::new("e-white", "White ABS 1mm", 1.0, 22.0),
        EdgebandDef::new("e-oak", "Oak Veneer Edge", 0.6, 22.0),
    ]
}

/// Seed the sample catalog for `org_id`.
pub fn seed_catalog(db_path: &str, org_id: &str) -> Result<SqliteCatalogRepository, Box<dyn Error>> {
    let repo = SqliteCatalogRepository::new(db_path)?;
    for material in sample_materials() {
        repo.upsert_material(org_id, &material)?;
    }
    for edgeband in sample_edgebands() {
        repo.upsert_edgeband(org_id, &edgeband)?;
    }
    Ok(repo)
}

/// Insert an org-scoped setting.
pub fn insert_test_config(
    db_path: &str,
    scope_id: &str,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn Error>> {
    let manager = ConfigManager::new(db_path)?;
    manager.set_config_value(scope_id, key, value)?;
    Ok(())
}

/// Write `contents` to a temp file with the given suffix (e.g. ".csv").
pub fn write_temp_file(suffix: &str, contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::with_suffix(suffix)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
