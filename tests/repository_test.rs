// ==========================================
// Repository / config integration tests
// ==========================================
// Target: SQLite catalog, config_kv settings, part sink round trip
// ==========================================

mod test_helpers;

use cutlist_intake::config::{config_keys, ConfigManager, IntakeConfig, GLOBAL_SCOPE};
use cutlist_intake::config::OrgSettingsReader;
use cutlist_intake::db::{open_sqlite_connection, read_schema_version, CURRENT_SCHEMA_VERSION};
use cutlist_intake::domain::{CutPart, MaterialDef, PartSize, SourceMethod};
use cutlist_intake::domain::PartAudit;
use cutlist_intake::repository::{CatalogRepository, PartSink, RepositoryError, SqliteCatalogRepository};
use std::sync::{Arc, Mutex};
use test_helpers::{create_test_db, insert_test_config, seed_catalog, TEST_ORG};

fn sample_part(l: f64) -> CutPart {
    CutPart::draft(
        PartSize::new(l, 300.0),
        18.0,
        "m-white-18",
        PartAudit::new(SourceMethod::ExcelTable, Some(format!("{}x300", l)), 0.9),
    )
}

#[test]
fn test_schema_version_recorded() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = open_sqlite_connection(&db_path).unwrap();
    assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
}

#[tokio::test]
async fn test_catalog_is_org_scoped_and_ordered() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = seed_catalog(&db_path, TEST_ORG).unwrap();
    repo.upsert_material("org-other", &MaterialDef::new("m-x", "Other Org Board", 16.0))
        .unwrap();

    let materials = repo.list_active_materials(TEST_ORG).await.unwrap();
    let ids: Vec<_> = materials.iter().map(|m| m.material_id.as_str()).collect();
    assert_eq!(ids, vec!["m-white-18", "m-oak-19", "m-black-22"]);
    assert_eq!(materials[0].sku.as_deref(), Some("WM-18"));
    assert!(materials[1].grained);

    // upsert keeps position and updates fields
    let mut renamed = materials[0].clone();
    renamed.name = "Premium White".to_string();
    repo.upsert_material(TEST_ORG, &renamed).unwrap();
    let materials = repo.list_active_materials(TEST_ORG).await.unwrap();
    assert_eq!(materials[0].name, "Premium White");
    assert_eq!(materials.len(), 3);

    let edgebands = repo.list_active_edgebands(TEST_ORG).await.unwrap();
    assert_eq!(edgebands.len(), 2);
    assert_eq!(repo.list_active_edgebands("org-other").await.unwrap().len(), 0);
}

#[test]
fn test_deactivate_unknown_material() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = seed_catalog(&db_path, TEST_ORG).unwrap();
    let err = repo.deactivate_material(TEST_ORG, "missing").unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_part_sink_round_trip() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = SqliteCatalogRepository::new(&db_path).unwrap();
    let parts = vec![sample_part(600.0), sample_part(700.0)];

    let saved = repo.save_parts(TEST_ORG, "batch-1", &parts).await.unwrap();
    assert_eq!(saved, 2);
    // re-saving the same ids replaces rows
    repo.save_parts(TEST_ORG, "batch-1", &parts).await.unwrap();

    let stored = repo.list_parts(TEST_ORG, "batch-1").unwrap();
    assert_eq!(stored, parts);
    assert!(repo.list_parts(TEST_ORG, "batch-2").unwrap().is_empty());
}

#[tokio::test]
async fn test_shared_connection_between_catalog_and_settings() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path).unwrap()));
    let repo = SqliteCatalogRepository::from_connection(conn.clone()).unwrap();
    let settings = ConfigManager::from_connection(conn).unwrap();

    repo.upsert_material(TEST_ORG, &MaterialDef::new("m1", "Birch Ply", 18.0))
        .unwrap();
    settings
        .set_config_value(TEST_ORG, config_keys::DEFAULT_MATERIAL_ID, "m1")
        .unwrap();

    let defaults = settings.get_org_defaults(TEST_ORG).await.unwrap();
    assert_eq!(defaults.default_material_id.as_deref(), Some("m1"));
    assert_eq!(repo.list_active_materials(TEST_ORG).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_intake_config_org_overrides() {
    let (_tmp, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, GLOBAL_SCOPE, config_keys::DEFAULT_MATERIAL_ID, "m-global").unwrap();
    insert_test_config(&db_path, TEST_ORG, config_keys::ALLOWED_THICKNESSES_MM, "16,18").unwrap();
    insert_test_config(&db_path, TEST_ORG, config_keys::MIN_CONFIDENCE, "1.7").unwrap();
    let settings = ConfigManager::new(&db_path).unwrap();

    let config = IntakeConfig::default()
        .with_org_settings(&settings, TEST_ORG)
        .await
        .unwrap();

    assert_eq!(config.text.default_material_id.as_deref(), Some("m-global"));
    assert_eq!(config.tabular.default_material_id.as_deref(), Some("m-global"));
    assert_eq!(config.validation.part.allowed_thicknesses_mm, vec![16.0, 18.0]);
    // clamped into [0, 1]
    assert_eq!(config.min_confidence, 1.0);
    assert_eq!(config.validation.part.standard_sheet.l, 2800.0);
}
