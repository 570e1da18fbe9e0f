// ==========================================
// Cutlist Intake - CLI Entry
// ==========================================
// Usage:
//   cutlist-intake <file> [org_id] [db_path]
//
// Reads a text / CSV / workbook file, runs the intake pipeline for the
// organization against the SQLite catalog and prints the JSON result.
// db_path defaults to $CUTLIST_INTAKE_DB_PATH, then the user data directory.
// ==========================================

use anyhow::{bail, Context};
use cutlist_intake::config::{ConfigManager, IntakeConfig};
use cutlist_intake::db::{get_default_db_path, open_sqlite_connection};
use cutlist_intake::domain::Cutlist;
use cutlist_intake::engine::{CutlistValidator, IntakePipeline};
use cutlist_intake::logging;
use cutlist_intake::repository::SqliteCatalogRepository;
use serde_json::json;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

const DEFAULT_ORG_ID: &str = "global";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(file) = args.next().map(PathBuf::from) else {
        bail!("usage: cutlist-intake <file> [org_id] [db_path]");
    };
    let org_id = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ORG_ID.to_string());
    let db_path = args.next().unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", cutlist_intake::APP_NAME, cutlist_intake::VERSION);
    tracing::info!(db_path = %db_path, org_id = %org_id, file = %file.display(), "starting intake");
    tracing::info!("==================================================");

    let conn = Arc::new(Mutex::new(
        open_sqlite_connection(&db_path).with_context(|| format!("opening {}", db_path))?,
    ));
    let catalog = Arc::new(SqliteCatalogRepository::from_connection(conn.clone())?);
    let settings = ConfigManager::from_connection(conn)?;

    let pipeline = IntakePipeline::load(
        IntakeConfig::default(),
        catalog.as_ref(),
        &settings,
        &org_id,
    )
    .await?
    .with_sink(catalog.clone());

    let outcome = pipeline
        .ingest_file(&file)
        .await
        .with_context(|| format!("ingesting {}", file.display()))?;

    let mut cutlist = Cutlist::new(outcome.batch_id.clone());
    pipeline.merge_into(&mut cutlist, &outcome);
    let validation = CutlistValidator::new(pipeline.config().validation.clone()).validate(&cutlist);

    let report = json!({
        "outcome": outcome,
        "cutlist": cutlist,
        "validation": validation,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
