// ==========================================
// Cutlist Intake - Cut Part Domain Model
// ==========================================
// Scope: canonical structured record of one panel to be cut
// Lifecycle: created by a parser, ids attached by the matcher,
//            diagnostics attached by validators, then merged or dropped
// ==========================================

use crate::domain::catalog::MatchResult;
use crate::domain::types::{EdgeId, Grain, SourceMethod};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Sentinel material id used when nothing could be resolved.
pub const DEFAULT_MATERIAL_ID: &str = "default";

/// Generate an opaque part id.
pub fn generate_part_id() -> String {
    format!("p_{}", Uuid::new_v4().simple())
}

// ==========================================
// PartSize
// ==========================================
// Millimeters; convention L >= W
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartSize {
    #[serde(rename = "L")]
    pub l: f64,
    #[serde(rename = "W")]
    pub w: f64,
}

impl PartSize {
    pub fn new(l: f64, w: f64) -> Self {
        Self { l, w }
    }

    pub fn area_mm2(&self) -> f64 {
        self.l * self.w
    }

    pub fn is_positive(&self) -> bool {
        self.l.is_finite() && self.w.is_finite() && self.l > 0.0 && self.w > 0.0
    }
}

// ==========================================
// Operations
// ==========================================

/// Edge banding request for one edge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub apply: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edgeband_id: Option<String>,
}

impl EdgeSpec {
    /// Apply request whose edgeband is still to be resolved.
    pub fn pending() -> Self {
        Self {
            apply: true,
            edgeband_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EdgingOps {
    pub edges: BTreeMap<EdgeId, EdgeSpec>,
    /// Raw edgeband text from the source (e.g. "white ABS"), resolved by the matcher
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edgeband_hint: Option<String>,
}

impl EdgingOps {
    pub fn applied_edges(&self) -> impl Iterator<Item = (&EdgeId, &EdgeSpec)> {
        self.edges.iter().filter(|(_, spec)| spec.apply)
    }

    pub fn has_any(&self) -> bool {
        self.edges.values().any(|spec| spec.apply)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrooveOp {
    pub side: EdgeId,
    pub offset_mm: f64,
    pub depth_mm: f64,
    pub width_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleOp {
    pub x_mm: f64,
    pub y_mm: f64,
    pub diameter_mm: f64,
    pub depth_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingOp {
    pub profile_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartOps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edging: Option<EdgingOps>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grooves: Vec<GrooveOp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<HoleOp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routing: Vec<RoutingOp>,
}

impl PartOps {
    pub fn has_edging(&self) -> bool {
        self.edging.as_ref().is_some_and(|e| e.has_any())
    }

    pub fn has_cnc(&self) -> bool {
        !self.grooves.is_empty() || !self.holes.is_empty() || !self.routing.is_empty()
    }
}

// ==========================================
// PartAudit - provenance
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartAudit {
    pub source_method: SourceMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    pub confidence: f64, // always in [0, 1]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub human_verified: bool,
    pub parsed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_match: Option<MatchResult>,
}

impl PartAudit {
    pub fn new(source_method: SourceMethod, raw_text: Option<String>, confidence: f64) -> Self {
        Self {
            source_method,
            raw_text,
            confidence: clamp_confidence(confidence),
            warnings: Vec::new(),
            errors: Vec::new(),
            human_verified: false,
            parsed_at: Utc::now(),
            material_match: None,
        }
    }

    pub fn set_confidence(&mut self, confidence: f64) {
        self.confidence = clamp_confidence(confidence);
    }
}

/// Clamp a confidence score into [0, 1]; NaN becomes 0.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ==========================================
// CutPart
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutPart {
    pub part_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub qty: u32,
    pub size: PartSize,
    pub thickness_mm: f64,
    pub material_id: String,
    pub grain: Grain,
    pub allow_rotation: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ops: Option<PartOps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Raw material text awaiting catalog resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_hint: Option<String>,
    pub audit: PartAudit,
}

impl CutPart {
    /// Draft part with a fresh id, rotation allowed and no grain.
    pub fn draft(
        size: PartSize,
        thickness_mm: f64,
        material_id: impl Into<String>,
        audit: PartAudit,
    ) -> Self {
        Self {
            part_id: generate_part_id(),
            label: None,
            qty: 1,
            size,
            thickness_mm,
            material_id: material_id.into(),
            grain: Grain::None,
            allow_rotation: true,
            group_id: None,
            ops: None,
            notes: None,
            tags: Vec::new(),
            material_hint: None,
            audit,
        }
    }

    /// Set grain and keep `allow_rotation` consistent with it.
    pub fn set_grain(&mut self, grain: Grain) {
        self.grain = grain;
        self.allow_rotation = !grain.is_constrained();
    }

    pub fn edging(&self) -> Option<&EdgingOps> {
        self.ops.as_ref().and_then(|ops| ops.edging.as_ref())
    }

    pub fn edging_mut(&mut self) -> &mut EdgingOps {
        self.ops
            .get_or_insert_with(PartOps::default)
            .edging
            .get_or_insert_with(EdgingOps::default)
    }

    pub fn has_edging(&self) -> bool {
        self.ops.as_ref().is_some_and(|ops| ops.has_edging())
    }

    pub fn has_cnc(&self) -> bool {
        self.ops.as_ref().is_some_and(|ops| ops.has_cnc())
    }

    /// Every edgeband id referenced by edging operations.
    pub fn edgeband_refs(&self) -> Vec<&str> {
        self.edging()
            .map(|e| {
                e.applied_edges()
                    .filter_map(|(_, spec)| spec.edgeband_id.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ==========================================
// PartPatch - explicit per-field update
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PartPatch {
    Label(Option<String>),
    Qty(u32),
    Size(PartSize),
    ThicknessMm(f64),
    MaterialId(String),
    Grain(Grain),
    AllowRotation(bool),
    GroupId(Option<String>),
    Notes(Option<String>),
    Edge { edge: EdgeId, spec: Option<EdgeSpec> },
    HumanVerified(bool),
}

impl PartPatch {
    /// Apply to a part and return the patch that restores the previous value.
    pub fn apply(&self, part: &mut CutPart) -> PartPatch {
        match self {
            PartPatch::Label(v) => PartPatch::Label(std::mem::replace(&mut part.label, v.clone())),
            PartPatch::Qty(v) => PartPatch::Qty(std::mem::replace(&mut part.qty, *v)),
            PartPatch::Size(v) => PartPatch::Size(std::mem::replace(&mut part.size, *v)),
            PartPatch::ThicknessMm(v) => {
                PartPatch::ThicknessMm(std::mem::replace(&mut part.thickness_mm, *v))
            }
            PartPatch::MaterialId(v) => {
                PartPatch::MaterialId(std::mem::replace(&mut part.material_id, v.clone()))
            }
            PartPatch::Grain(v) => PartPatch::Grain(std::mem::replace(&mut part.grain, *v)),
            PartPatch::AllowRotation(v) => {
                PartPatch::AllowRotation(std::mem::replace(&mut part.allow_rotation, *v))
            }
            PartPatch::GroupId(v) => {
                PartPatch::GroupId(std::mem::replace(&mut part.group_id, v.clone()))
            }
            PartPatch::Notes(v) => PartPatch::Notes(std::mem::replace(&mut part.notes, v.clone())),
            PartPatch::Edge { edge, spec } => {
                let edging = part.edging_mut();
                let previous = match spec {
                    Some(s) => edging.edges.insert(*edge, s.clone()),
                    None => edging.edges.remove(edge),
                };
                PartPatch::Edge {
                    edge: *edge,
                    spec: previous,
                }
            }
            PartPatch::HumanVerified(v) => PartPatch::HumanVerified(std::mem::replace(
                &mut part.audit.human_verified,
                *v,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_part() -> CutPart {
        CutPart::draft(
            PartSize::new(720.0, 560.0),
            18.0,
            "mat-1",
            PartAudit::new(SourceMethod::Manual, None, 1.0),
        )
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(generate_part_id(), generate_part_id());
    }

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(1.4), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
    }

    #[test]
    fn test_set_grain_disables_rotation() {
        let mut part = sample_part();
        part.set_grain(Grain::AlongL);
        assert!(!part.allow_rotation);
        part.set_grain(Grain::None);
        assert!(part.allow_rotation);
    }

    #[test]
    fn test_patch_returns_inverse() {
        let mut part = sample_part();
        let inverse = PartPatch::Qty(4).apply(&mut part);
        assert_eq!(part.qty, 4);
        assert_eq!(inverse, PartPatch::Qty(1));

        let inverse = PartPatch::Edge {
            edge: EdgeId::L1,
            spec: Some(EdgeSpec::pending()),
        }
        .apply(&mut part);
        assert!(part.has_edging());
        inverse.apply(&mut part);
        assert!(!part.has_edging());
    }

    #[test]
    fn test_edging_serializes_edge_keys() {
        let mut part = sample_part();
        part.edging_mut().edges.insert(EdgeId::L1, EdgeSpec::pending());
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["ops"]["edging"]["edges"]["L1"]["apply"], true);
        assert_eq!(json["size"]["L"], 720.0);
    }
}
