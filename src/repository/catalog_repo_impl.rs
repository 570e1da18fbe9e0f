// ==========================================
// Cutlist Intake - SQLite Catalog Repository
// ==========================================
// Scope: CatalogRepository + PartSink over rusqlite
// Tables: materials, edgebands, cut_parts (see db::init_schema)
// ==========================================

use crate::db::{configure_sqlite_connection, init_schema, open_sqlite_connection};
use crate::domain::catalog::{EdgebandDef, MaterialDef};
use crate::domain::part::CutPart;
use crate::repository::catalog_repo::{CatalogRepository, PartSink};
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument};

// ==========================================
// SqliteCatalogRepository
// ==========================================
pub struct SqliteCatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogRepository {
    /// Open (and initialize) the database at `db_path`.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection (PRAGMAs and schema are re-applied, both idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn.lock()?;
            configure_sqlite_connection(&guard)?;
            init_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    // ===== catalog maintenance =====

    /// Insert or replace a material (active, appended to catalog order).
    pub fn upsert_material(&self, org_id: &str, material: &MaterialDef) -> RepositoryResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            r#"
            INSERT INTO materials (org_id, material_id, name, sku, thickness_mm, core_type, grained, active, sort_order)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1,
                    (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM materials WHERE org_id = ?1))
            ON CONFLICT(org_id, material_id) DO UPDATE SET
                name = excluded.name,
                sku = excluded.sku,
                thickness_mm = excluded.thickness_mm,
                core_type = excluded.core_type,
                grained = excluded.grained,
                active = 1
            "#,
            params![
                org_id,
                material.material_id,
                material.name,
                material.sku,
                material.thickness_mm,
                material.core_type,
                material.grained,
            ],
        )?;
        Ok(())
    }

    /// Insert or replace an edgeband (active, appended to catalog order).
    pub fn upsert_edgeband(&self, org_id: &str, edgeband: &EdgebandDef) -> RepositoryResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            r#"
            INSERT INTO edgebands (org_id, edgeband_id, name, sku, thickness_mm, width_mm, active, sort_order)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1,
                    (SELECT COALESCE(MAX(sort_order), 0) + 1 FROM edgebands WHERE org_id = ?1))
            ON CONFLICT(org_id, edgeband_id) DO UPDATE SET
                name = excluded.name,
                sku = excluded.sku,
                thickness_mm = excluded.thickness_mm,
                width_mm = excluded.width_mm,
                active = 1
            "#,
            params![
                org_id,
                edgeband.edgeband_id,
                edgeband.name,
                edgeband.sku,
                edgeband.thickness_mm,
                edgeband.width_mm,
            ],
        )?;
        Ok(())
    }

    /// Hide a material from matching without deleting it.
    ///
    /// # Errors
    /// - `NotFound` when the material does not exist for the org
    pub fn deactivate_material(&self, org_id: &str, material_id: &str) -> RepositoryResult<()> {
        let conn = self.conn.lock()?;
        let changed = conn.execute(
            "UPDATE materials SET active = 0 WHERE org_id = ?1 AND material_id = ?2",
            params![org_id, material_id],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "material".to_string(),
                id: material_id.to_string(),
            });
        }
        Ok(())
    }

    /// Parts stored for one intake batch, in insertion order.
    pub fn list_parts(&self, org_id: &str, batch_id: &str) -> RepositoryResult<Vec<CutPart>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            "SELECT part_json FROM cut_parts WHERE org_id = ?1 AND batch_id = ?2 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![org_id, batch_id], |row| row.get::<_, String>(0))?;

        let mut parts = Vec::new();
        for row in rows {
            parts.push(serde_json::from_str(&row?)?);
        }
        Ok(parts)
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    #[instrument(skip(self))]
    async fn list_active_materials(&self, org_id: &str) -> RepositoryResult<Vec<MaterialDef>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT material_id, name, sku, thickness_mm, core_type, grained
            FROM materials
            WHERE org_id = ?1 AND active = 1
            ORDER BY sort_order, material_id
            "#,
        )?;
        let rows = stmt.query_map(params![org_id], |row| {
            Ok(MaterialDef {
                material_id: row.get(0)?,
                name: row.get(1)?,
                sku: row.get(2)?,
                thickness_mm: row.get(3)?,
                core_type: row.get(4)?,
                grained: row.get(5)?,
            })
        })?;

        let materials = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(count = materials.len(), "materials loaded");
        Ok(materials)
    }

    #[instrument(skip(self))]
    async fn list_active_edgebands(&self, org_id: &str) -> RepositoryResult<Vec<EdgebandDef>> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT edgeband_id, name, sku, thickness_mm, width_mm
            FROM edgebands
            WHERE org_id = ?1 AND active = 1
            ORDER BY sort_order, edgeband_id
            "#,
        )?;
        let rows = stmt.query_map(params![org_id], |row| {
            Ok(EdgebandDef {
                edgeband_id: row.get(0)?,
                name: row.get(1)?,
                sku: row.get(2)?,
                thickness_mm: row.get(3)?,
                width_mm: row.get(4)?,
            })
        })?;

        let edgebands = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(count = edgebands.len(), "edgebands loaded");
        Ok(edgebands)
    }
}

#[async_trait]
impl PartSink for SqliteCatalogRepository {
    #[instrument(skip(self, parts), fields(parts = parts.len()))]
    async fn save_parts(
        &self,
        org_id: &str,
        batch_id: &str,
        parts: &[CutPart],
    ) -> RepositoryResult<usize> {
        let mut conn = self.conn.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let created_at = Utc::now().to_rfc3339();

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO cut_parts (
                    org_id, batch_id, part_id, material_id, qty, length_mm, width_mm,
                    thickness_mm, confidence, part_json, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )?;
            for part in parts {
                let json = serde_json::to_string(part)?;
                stmt.execute(params![
                    org_id,
                    batch_id,
                    part.part_id,
                    part.material_id,
                    part.qty,
                    part.size.l,
                    part.size.w,
                    part.thickness_mm,
                    part.audit.confidence,
                    json,
                    created_at,
                ])?;
                count += 1;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        debug!(count, batch_id, "parts saved");
        Ok(count)
    }
}
