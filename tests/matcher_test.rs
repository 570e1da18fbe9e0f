// ==========================================
// MatcherContext integration tests
// ==========================================
// Target: catalog loading from SQLite, ladder ordering, totality
// ==========================================

mod test_helpers;

use cutlist_intake::config::{config_keys, ConfigManager};
use cutlist_intake::domain::MatchType;
use cutlist_intake::engine::MatcherContext;
use cutlist_intake::repository::SqliteCatalogRepository;
use test_helpers::{create_test_db, insert_test_config, seed_catalog, TEST_ORG};

#[tokio::test]
async fn test_load_from_sqlite() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let catalog = seed_catalog(&db_path, TEST_ORG).unwrap();
    insert_test_config(&db_path, TEST_ORG, config_keys::DEFAULT_EDGEBAND_ID, "e-oak").unwrap();
    let settings = ConfigManager::new(&db_path).unwrap();

    let ctx = MatcherContext::load(&catalog, &settings, TEST_ORG).await.unwrap();
    assert_eq!(ctx.material_count(), 3);
    assert_eq!(ctx.edgeband_count(), 2);
    assert_eq!(ctx.defaults().default_edgeband_id.as_deref(), Some("e-oak"));
    assert_eq!(ctx.grained_material_ids(), vec!["m-oak-19".to_string()]);

    // no correlation → org default edgeband, not the first one
    let eb = ctx.find_edgeband(None, Some("Concrete")).unwrap();
    assert_eq!(eb.id, "e-oak");
    assert_eq!(eb.match_type, MatchType::Default);
    assert!((eb.confidence - 0.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_inactive_materials_are_not_matched() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let catalog = seed_catalog(&db_path, TEST_ORG).unwrap();
    catalog.deactivate_material(TEST_ORG, "m-black-22").unwrap();
    let settings = ConfigManager::new(&db_path).unwrap();

    let ctx = MatcherContext::load(&catalog, &settings, TEST_ORG).await.unwrap();
    assert_eq!(ctx.material_count(), 2);
    let r = ctx.match_material("Black Gloss Acrylic", None);
    assert_ne!(r.id, "m-black-22");
}

#[tokio::test]
async fn test_ladder_is_monotonic() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let catalog = seed_catalog(&db_path, TEST_ORG).unwrap();
    let settings = ConfigManager::new(&db_path).unwrap();
    let ctx = MatcherContext::load(&catalog, &settings, TEST_ORG).await.unwrap();

    let exact = ctx.match_material("White Melamine", None);
    let fuzzy = ctx.match_material("Oak Veneer", None);
    let keyword = ctx.match_material("gloss door", None);
    let fallback = ctx.match_material("zebrano", None);

    assert_eq!(exact.match_type, MatchType::Exact);
    assert_eq!(fuzzy.match_type, MatchType::Fuzzy);
    assert_eq!(keyword.match_type, MatchType::Keyword);
    assert_eq!(fallback.match_type, MatchType::Default);
    assert!(exact.confidence > fuzzy.confidence);
    assert!(fuzzy.confidence > keyword.confidence);
    assert!(keyword.confidence > fallback.confidence);
}

#[tokio::test]
async fn test_empty_org_is_total() {
    let (_tmp, db_path) = create_test_db().unwrap();
    seed_catalog(&db_path, TEST_ORG).unwrap();
    let catalog = SqliteCatalogRepository::new(&db_path).unwrap();
    let settings = ConfigManager::new(&db_path).unwrap();

    let ctx = MatcherContext::load(&catalog, &settings, "org-empty").await.unwrap();
    assert_eq!(ctx.material_count(), 0);

    for raw in ["", "White Melamine", "18mm oak", "???"] {
        let r = ctx.match_material(raw, Some(18.0));
        assert_eq!(r.id, "default");
        assert!((0.0..=1.0).contains(&r.confidence));
    }
    assert!(ctx.find_edgeband(Some("White ABS 1mm"), None).is_none());
    assert_eq!(ctx.match_edgeband(Some("White ABS 1mm"), None).id, "default");
}
