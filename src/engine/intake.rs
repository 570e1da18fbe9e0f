// ==========================================
// Cutlist Intake - Intake Pipeline
// ==========================================
// Flow: parse → match → validate → decide → (persist) → merge
// Inputs: free text, string grids, CSV/TSV/TXT, workbook files
// Decision per item:
//   - no part / validation errors → rejected
//   - confidence < min_confidence → needs review
//   - otherwise → accepted
// Rule: items are isolated; one bad line or row never fails the batch
// ==========================================

use crate::config::intake_config::IntakeConfig;
use crate::config::org_settings_trait::OrgSettingsReader;
use crate::domain::cutlist::Cutlist;
use crate::domain::part::CutPart;
use crate::domain::validation::PartValidationResult;
use crate::engine::cutlist_editor::merge_parts;
use crate::engine::error::IntakeResult;
use crate::engine::matcher::{MatchStats, MatcherContext};
use crate::engine::part_validator::PartValidator;
use crate::importer::error::ImportError;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::Grid;
use crate::importer::sheet_selector::select_sheet;
use crate::importer::tabular_parser::parse_grid;
use crate::importer::text_parser::{parse_text_batch, ParseStats};
use crate::repository::catalog_repo::{CatalogRepository, PartSink};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Extensions read as free text (one part per line) instead of a delimited grid.
const FREE_TEXT_EXTENSIONS: &[&str] = &["txt", "text"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeDecision {
    Accepted,
    NeedsReview,
    Rejected,
}

/// One line / row after the full pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeItem {
    /// "line 3", "row 7", ...
    pub source_ref: String,
    pub decision: IntakeDecision,
    pub confidence: f64,
    pub part: Option<CutPart>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<PartValidationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeOutcome {
    pub batch_id: String,
    pub org_id: String,
    /// Input description (file path, "text", "grid")
    pub source: String,
    /// Worksheet used for workbook input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub items: Vec<IntakeItem>,
    pub parse_stats: ParseStats,
    pub match_stats: MatchStats,
    pub accepted: usize,
    pub needs_review: usize,
    pub rejected: usize,
    /// Parts written through the part sink
    pub persisted: usize,
}

impl IntakeOutcome {
    fn parts_with(&self, decision: IntakeDecision) -> impl Iterator<Item = &CutPart> {
        self.items
            .iter()
            .filter(move |item| item.decision == decision)
            .filter_map(|item| item.part.as_ref())
    }

    pub fn accepted_parts(&self) -> impl Iterator<Item = &CutPart> {
        self.parts_with(IntakeDecision::Accepted)
    }

    pub fn review_parts(&self) -> impl Iterator<Item = &CutPart> {
        self.parts_with(IntakeDecision::NeedsReview)
    }
}

/// Parser output normalized across text and tabular input.
struct Draft {
    source_ref: String,
    part: Option<CutPart>,
    confidence: f64,
    errors: Vec<String>,
    warnings: Vec<String>,
}

// ==========================================
// IntakePipeline
// ==========================================
pub struct IntakePipeline {
    config: IntakeConfig,
    matcher: MatcherContext,
    validator: PartValidator,
    sink: Option<Arc<dyn PartSink>>,
}

impl IntakePipeline {
    pub fn new(config: IntakeConfig, matcher: MatcherContext) -> Self {
        let mut part_config = config.validation.part.clone();
        for id in matcher.grained_material_ids() {
            if !part_config.grained_material_ids.contains(&id) {
                part_config.grained_material_ids.push(id);
            }
        }
        Self {
            validator: PartValidator::new(part_config),
            config,
            matcher,
            sink: None,
        }
    }

    /// Apply org settings to `config`, load the catalog and build the pipeline.
    #[instrument(skip(config, catalog, settings))]
    pub async fn load(
        config: IntakeConfig,
        catalog: &dyn CatalogRepository,
        settings: &dyn OrgSettingsReader,
        org_id: &str,
    ) -> IntakeResult<Self> {
        let config = config.with_org_settings(settings, org_id).await?;
        let matcher = MatcherContext::load(catalog, settings, org_id).await?;
        Ok(Self::new(config, matcher))
    }

    pub fn with_sink(mut self, sink: Arc<dyn PartSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    pub fn matcher(&self) -> &MatcherContext {
        &self.matcher
    }

    // ==========================================
    // Entry points
    // ==========================================

    /// Free text: one part per line (also split on ';' and '|').
    #[instrument(skip(self, text), fields(org_id = %self.matcher.org_id()))]
    pub async fn ingest_text(&self, text: &str) -> IntakeResult<IntakeOutcome> {
        let batch = parse_text_batch(text, &self.config.text);
        let drafts = batch
            .results
            .into_iter()
            .map(|r| Draft {
                source_ref: format!("line {}", r.line_number),
                part: r.part,
                confidence: r.confidence,
                errors: r.errors,
                warnings: r.warnings,
            })
            .collect();
        self.process("text", None, drafts, batch.stats).await
    }

    /// String grid: header row + data rows.
    #[instrument(skip(self, grid), fields(org_id = %self.matcher.org_id(), rows = grid.len()))]
    pub async fn ingest_grid(&self, grid: &Grid) -> IntakeResult<IntakeOutcome> {
        self.ingest_grid_from("grid", None, grid).await
    }

    /// File by extension: .txt as free text, CSV/TSV and workbooks as grids.
    ///
    /// For workbooks the best-scoring sheet is used (first sheet when
    /// `auto_select_sheet` is off).
    #[instrument(skip(self), fields(org_id = %self.matcher.org_id()))]
    pub async fn ingest_file(&self, path: &Path) -> IntakeResult<IntakeOutcome> {
        let source = path.display().to_string();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if FREE_TEXT_EXTENSIONS.contains(&ext.as_str()) {
            let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ImportError::FileNotFound(source.clone())
                } else {
                    ImportError::FileReadError(e.to_string())
                }
            })?;
            let mut outcome = self.ingest_text(&text).await?;
            outcome.source = source;
            return Ok(outcome);
        }

        // csv / calamine reads are blocking
        let owned = path.to_path_buf();
        let workbook = tokio::task::spawn_blocking(move || UniversalFileParser.parse(owned))
            .await
            .map_err(|e| ImportError::Other(anyhow::anyhow!("file parse task failed: {}", e)))??;
        if workbook.sheets.is_empty() {
            return Err(ImportError::EmptyWorkbook.into());
        }
        let index = if self.config.auto_select_sheet {
            select_sheet(&workbook.sheets).unwrap_or(0)
        } else {
            0
        };
        let sheet = &workbook.sheets[index];
        info!(sheet = %sheet.name, index, sheets = workbook.sheets.len(), "worksheet selected");
        self.ingest_grid_from(&source, Some(sheet.name.clone()), &sheet.rows)
            .await
    }

    /// Several files concurrently; workbook parsing runs on the blocking pool.
    /// Results keep input order and each one is independent.
    pub async fn ingest_files(&self, paths: &[PathBuf]) -> Vec<IntakeResult<IntakeOutcome>> {
        join_all(paths.iter().map(|p| self.ingest_file(p))).await
    }

    /// Append accepted parts to a working cutlist. Returns the merged part ids.
    pub fn merge_into(&self, cutlist: &mut Cutlist, outcome: &IntakeOutcome) -> Vec<String> {
        let ids = merge_parts(cutlist, outcome.accepted_parts().cloned().collect());
        info!(doc_id = %cutlist.doc_id, merged = ids.len(), "accepted parts merged");
        ids
    }

    // ==========================================
    // Shared stages
    // ==========================================

    async fn ingest_grid_from(
        &self,
        source: &str,
        sheet: Option<String>,
        grid: &Grid,
    ) -> IntakeResult<IntakeOutcome> {
        let parsed = parse_grid(grid, &self.config.tabular)?;
        let drafts = parsed
            .results
            .into_iter()
            .map(|r| Draft {
                source_ref: format!("row {}", r.row_index + 1),
                part: r.part,
                confidence: r.confidence,
                errors: r.errors,
                warnings: r.warnings,
            })
            .collect();
        self.process(source, sheet, drafts, parsed.stats).await
    }

    async fn process(
        &self,
        source: &str,
        sheet: Option<String>,
        drafts: Vec<Draft>,
        parse_stats: ParseStats,
    ) -> IntakeResult<IntakeOutcome> {
        let batch_id = Uuid::new_v4().to_string();

        // === match ===
        let mut parts: Vec<CutPart> = drafts.iter().filter_map(|d| d.part.clone()).collect();
        let match_stats = self.matcher.apply_matches(&mut parts);

        // === validate (cross-part rules see the whole batch) ===
        let validations = self.validator.validate_parts(&parts);

        // === decide ===
        let mut matched = parts.into_iter().zip(validations);
        let mut items = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let item = match draft.part {
                None => IntakeItem {
                    source_ref: draft.source_ref,
                    decision: IntakeDecision::Rejected,
                    confidence: draft.confidence,
                    part: None,
                    parse_errors: draft.errors,
                    parse_warnings: draft.warnings,
                    validation: None,
                },
                Some(_) => {
                    let Some((part, validation)) = matched.next() else {
                        break;
                    };
                    let confidence = part.audit.confidence;
                    let decision = if !validation.valid {
                        IntakeDecision::Rejected
                    } else if confidence < self.config.min_confidence {
                        IntakeDecision::NeedsReview
                    } else {
                        IntakeDecision::Accepted
                    };
                    IntakeItem {
                        source_ref: draft.source_ref,
                        decision,
                        confidence,
                        part: Some(part),
                        parse_errors: draft.errors,
                        parse_warnings: draft.warnings,
                        validation: Some(validation),
                    }
                }
            };
            items.push(item);
        }

        let count = |d: IntakeDecision| items.iter().filter(|i| i.decision == d).count();
        let mut outcome = IntakeOutcome {
            batch_id,
            org_id: self.matcher.org_id().to_string(),
            source: source.to_string(),
            sheet,
            accepted: count(IntakeDecision::Accepted),
            needs_review: count(IntakeDecision::NeedsReview),
            rejected: count(IntakeDecision::Rejected),
            items,
            parse_stats,
            match_stats,
            persisted: 0,
        };

        // === persist ===
        if self.config.persist_accepted && outcome.accepted > 0 {
            if let Some(sink) = &self.sink {
                let accepted: Vec<CutPart> = outcome.accepted_parts().cloned().collect();
                outcome.persisted = sink
                    .save_parts(&outcome.org_id, &outcome.batch_id, &accepted)
                    .await?;
            }
        }

        if outcome.rejected > 0 {
            warn!(
                batch_id = %outcome.batch_id,
                rejected = outcome.rejected,
                "items rejected"
            );
        }
        info!(
            batch_id = %outcome.batch_id,
            source = %outcome.source,
            accepted = outcome.accepted,
            needs_review = outcome.needs_review,
            rejected = outcome.rejected,
            persisted = outcome.persisted,
            "intake batch complete"
        );
        Ok(outcome)
    }
}
