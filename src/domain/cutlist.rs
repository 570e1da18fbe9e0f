// ==========================================
// Cutlist Intake - Cutlist Document Model
// ==========================================
// Scope: working cutlist that accepted parts are merged into
// ==========================================

use crate::domain::catalog::{EdgebandDef, MaterialDef};
use crate::domain::part::CutPart;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
}

/// Operations the downstream shop declares it can perform on this job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub edging: bool,
    pub cnc_holes: bool,
    pub cnc_grooves: bool,
    pub cnc_routing: bool,
}

impl Capabilities {
    pub fn any_cnc(&self) -> bool {
        self.cnc_holes || self.cnc_grooves || self.cnc_routing
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cutlist {
    pub doc_id: String,
    #[serde(default)]
    pub job: JobInfo,
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Catalog subset declared by the document
    #[serde(default)]
    pub materials: Vec<MaterialDef>,
    #[serde(default)]
    pub edgebands: Vec<EdgebandDef>,
    #[serde(default)]
    pub parts: Vec<CutPart>,
}

impl Cutlist {
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            ..Default::default()
        }
    }

    pub fn find_part(&self, part_id: &str) -> Option<usize> {
        self.parts.iter().position(|p| p.part_id == part_id)
    }

    pub fn total_pieces(&self) -> u64 {
        self.parts.iter().map(|p| u64::from(p.qty)).sum()
    }
}
