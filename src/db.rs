// ==========================================
// Cutlist Intake - SQLite Connection & Schema
// ==========================================
// Goals:
// - every Connection::open goes through the same PRAGMAs
// - one idempotent schema for catalog, org settings and the part sink
// ==========================================

use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version written by `init_schema`
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Env var overriding the default database location
pub const DB_PATH_ENV: &str = "CUTLIST_INTAKE_DB_PATH";

/// Apply per-connection PRAGMAs (foreign keys and busy timeout are per connection).
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the shared configuration.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Create tables if missing (idempotent).
///
/// Tables:
/// - materials / edgebands: org catalog (read by the matcher)
/// - config_kv: org-scoped settings (scope_id = org id, 'global' for shared)
/// - cut_parts: accepted parts written by the part sink
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS materials (
            org_id TEXT NOT NULL,
            material_id TEXT NOT NULL,
            name TEXT NOT NULL,
            sku TEXT,
            thickness_mm REAL NOT NULL,
            core_type TEXT,
            grained INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1,
            sort_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (org_id, material_id)
        );

        CREATE TABLE IF NOT EXISTS edgebands (
            org_id TEXT NOT NULL,
            edgeband_id TEXT NOT NULL,
            name TEXT NOT NULL,
            sku TEXT,
            thickness_mm REAL NOT NULL,
            width_mm REAL NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            sort_order INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (org_id, edgeband_id)
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS cut_parts (
            org_id TEXT NOT NULL,
            batch_id TEXT NOT NULL,
            part_id TEXT NOT NULL,
            material_id TEXT NOT NULL,
            qty INTEGER NOT NULL,
            length_mm REAL NOT NULL,
            width_mm REAL NOT NULL,
            thickness_mm REAL NOT NULL,
            confidence REAL NOT NULL,
            part_json TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (org_id, batch_id, part_id)
        );
        "#,
    )?;

    if read_schema_version(conn)?.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [CURRENT_SCHEMA_VERSION],
        )?;
    }
    Ok(())
}

/// Read schema_version (None when the table is missing or empty).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Default database path
///
/// 1. `CUTLIST_INTAKE_DB_PATH` when set and non-blank
/// 2. `<data_dir>/cutlist-intake/cutlist_intake.db`
/// 3. `./cutlist_intake.db` when no data dir is known
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./cutlist_intake.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("cutlist-intake");
        // best-effort: opening the connection reports the real failure
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("cutlist_intake.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_schema_version_missing_table() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }

    #[test]
    fn test_get_default_db_path_not_empty() {
        assert!(get_default_db_path().ends_with(".db") || std::env::var(DB_PATH_ENV).is_ok());
    }
}
