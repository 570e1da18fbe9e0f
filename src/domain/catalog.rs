// ==========================================
// Cutlist Intake - Catalog Domain Model
// ==========================================
// Scope: organization material / edgeband catalog entries and match results
// Lifecycle: loaded once per matching session, read-only inside it
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// MaterialDef - sheet material catalog entry
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDef {
    pub material_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub thickness_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_type: Option<String>, // e.g. "mdf", "particleboard", "plywood"
    #[serde(default)]
    pub grained: bool,
}

impl MaterialDef {
    pub fn new(material_id: impl Into<String>, name: impl Into<String>, thickness_mm: f64) -> Self {
        Self {
            material_id: material_id.into(),
            name: name.into(),
            sku: None,
            thickness_mm,
            core_type: None,
            grained: false,
        }
    }
}

// ==========================================
// EdgebandDef - edge banding catalog entry
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgebandDef {
    pub edgeband_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub thickness_mm: f64,
    pub width_mm: f64,
}

impl EdgebandDef {
    pub fn new(
        edgeband_id: impl Into<String>,
        name: impl Into<String>,
        thickness_mm: f64,
        width_mm: f64,
    ) -> Self {
        Self {
            edgeband_id: edgeband_id.into(),
            name: name.into(),
            sku: None,
            thickness_mm,
            width_mm,
        }
    }
}

// ==========================================
// OrgDefaults - organization-level fallbacks
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgDefaults {
    pub default_material_id: Option<String>,
    pub default_edgeband_id: Option<String>,
}

// ==========================================
// MatchType / MatchResult
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Keyword,
    Thickness,     // only catalog entry at the requested thickness
    Default,       // fallback ladder
    MaterialMatch, // edgeband correlated with the sheet material
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchType::Exact => "exact",
            MatchType::Fuzzy => "fuzzy",
            MatchType::Keyword => "keyword",
            MatchType::Thickness => "thickness",
            MatchType::Default => "default",
            MatchType::MaterialMatch => "material_match",
        };
        write!(f, "{}", s)
    }
}

/// Resolution of a raw material/edgeband reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: String,
    pub name: String,
    pub confidence: f64,
    pub match_type: MatchType,
    /// What the match was made on (raw text, keyword, thickness, ...)
    pub matched_on: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_type_wire_name() {
        assert_eq!(
            serde_json::to_string(&MatchType::MaterialMatch).unwrap(),
            "\"material_match\""
        );
        assert_eq!(MatchType::Fuzzy.to_string(), "fuzzy");
    }
}
