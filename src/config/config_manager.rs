// ==========================================
// Cutlist Intake - Config Manager
// ==========================================
// Scope: org-scoped settings lookup and overrides
// Storage: config_kv table (scope_id = org id, 'global' for shared values)
// Lookup: org scope first, then 'global', then built-in default
// ==========================================

use crate::config::org_settings_trait::OrgSettingsReader;
use crate::config::validation_config::SheetSize;
use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::catalog::OrgDefaults;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Scope shared by every organization
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open the database at `db_path` (schema is created when missing).
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection (PRAGMAs re-applied, idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn.lock()?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_scoped_value(&self, scope_id: &str, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.conn.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![scope_id, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Value for `key`: org scope, then global scope.
    pub fn get_config_value(&self, org_id: &str, key: &str) -> RepositoryResult<Option<String>> {
        if let Some(v) = self.get_scoped_value(org_id, key)? {
            return Ok(Some(v));
        }
        if org_id == GLOBAL_SCOPE {
            return Ok(None);
        }
        self.get_scoped_value(GLOBAL_SCOPE, key)
    }

    /// Insert or overwrite a value in a scope.
    pub fn set_config_value(&self, scope_id: &str, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![scope_id, key, value],
        )?;
        Ok(())
    }

    /// Remove a value from a scope (missing keys are not an error).
    pub fn delete_config_value(&self, scope_id: &str, key: &str) -> RepositoryResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "DELETE FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![scope_id, key],
        )?;
        Ok(())
    }

    /// Effective settings of an org as a JSON object (global values overlaid by org values).
    pub fn get_config_snapshot(&self, org_id: &str) -> RepositoryResult<String> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT key, value FROM config_kv
            WHERE scope_id = ?1 OR scope_id = ?2
            ORDER BY CASE WHEN scope_id = ?1 THEN 0 ELSE 1 END, key
            "#,
        )?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE, org_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            map.insert(key, value);
        }
        Ok(serde_json::to_string(&map)?)
    }

    fn get_f64(&self, org_id: &str, key: &str) -> RepositoryResult<Option<f64>> {
        match self.get_config_value(org_id, key)? {
            None => Ok(None),
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => {
                    warn!(org_id, key, value = %raw, "ignoring non-numeric setting");
                    Ok(None)
                }
            },
        }
    }

    fn get_non_blank(&self, org_id: &str, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self
            .get_config_value(org_id, key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }
}

#[async_trait]
impl OrgSettingsReader for ConfigManager {
    async fn get_org_defaults(&self, org_id: &str) -> RepositoryResult<OrgDefaults> {
        Ok(OrgDefaults {
            default_material_id: self.get_non_blank(org_id, config_keys::DEFAULT_MATERIAL_ID)?,
            default_edgeband_id: self.get_non_blank(org_id, config_keys::DEFAULT_EDGEBAND_ID)?,
        })
    }

    async fn get_standard_sheet(&self, org_id: &str) -> RepositoryResult<SheetSize> {
        let default = SheetSize::default();
        let l = self.get_f64(org_id, config_keys::SHEET_LENGTH_MM)?;
        let w = self.get_f64(org_id, config_keys::SHEET_WIDTH_MM)?;
        Ok(SheetSize {
            l: l.filter(|v| *v > 0.0).unwrap_or(default.l),
            w: w.filter(|v| *v > 0.0).unwrap_or(default.w),
        })
    }

    async fn get_allowed_thicknesses(&self, org_id: &str) -> RepositoryResult<Option<Vec<f64>>> {
        let Some(raw) = self.get_non_blank(org_id, config_keys::ALLOWED_THICKNESSES_MM)? else {
            return Ok(None);
        };
        let values: Vec<f64> = raw
            .split(',')
            .filter_map(|s| s.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .collect();
        if values.is_empty() {
            warn!(org_id, value = %raw, "allowed thicknesses unreadable, keeping defaults");
            return Ok(None);
        }
        Ok(Some(values))
    }

    async fn get_min_confidence(&self, org_id: &str) -> RepositoryResult<Option<f64>> {
        self.get_f64(org_id, config_keys::MIN_CONFIDENCE)
    }
}

// ==========================================
// Config keys
// ==========================================
pub mod config_keys {
    // catalog fallbacks
    pub const DEFAULT_MATERIAL_ID: &str = "default_material_id";
    pub const DEFAULT_EDGEBAND_ID: &str = "default_edgeband_id";

    // validation
    pub const SHEET_LENGTH_MM: &str = "sheet_length_mm";
    pub const SHEET_WIDTH_MM: &str = "sheet_width_mm";
    pub const ALLOWED_THICKNESSES_MM: &str = "allowed_thicknesses_mm"; // "16,18,25"

    // review routing
    pub const MIN_CONFIDENCE: &str = "min_confidence";
}
