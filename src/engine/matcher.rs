// ==========================================
// Cutlist Intake - Material / Edgeband Matcher
// ==========================================
// Scope: raw material / edgeband text → catalog id + confidence
// Material ladder: exact → fuzzy → keyword → thickness → org default → first → "default"
// Edgeband ladder: exact → fuzzy → correlation with sheet material → org default → first
// Rule: never fails, every call yields a result (no error channel)
// ==========================================

use crate::config::org_settings_trait::OrgSettingsReader;
use crate::domain::catalog::{EdgebandDef, MatchResult, MatchType, MaterialDef, OrgDefaults};
use crate::domain::part::{clamp_confidence, CutPart, DEFAULT_MATERIAL_ID};
use crate::importer::text_normalizer::{
    extract_keywords, fuzzy_score, normalize_text, shares_color_keyword,
};
use crate::repository::catalog_repo::CatalogRepository;
use crate::repository::error::RepositoryResult;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

// ===== material ladder =====
const EXACT_CONFIDENCE: f64 = 0.95;
const THICKNESS_BONUS: f64 = 0.05;
const THICKNESS_TOLERANCE_MM: f64 = 0.01;
const FUZZY_MIN_SCORE: f64 = 0.8;
const FUZZY_FACTOR: f64 = 0.9;
const FUZZY_CAP: f64 = 0.9;
const KEYWORD_CONFIDENCE: f64 = 0.7;
const THICKNESS_CONFIDENCE: f64 = 0.6;
const ORG_DEFAULT_CONFIDENCE: f64 = 0.5;
const FIRST_ENTRY_CONFIDENCE: f64 = 0.3;
const SYNTHETIC_CONFIDENCE: f64 = 0.1;

// ===== edgeband ladder =====
const EDGEBAND_FUZZY_MIN_SCORE: f64 = 0.5;
const CORRELATION_MIN_SCORE: f64 = 0.4;
const CORRELATION_CAP: f64 = 0.85;

/// Edgeband type words kept as keywords even when short ("pp").
const EDGEBAND_TYPES: &[&str] = &[
    "abs", "pvc", "pp", "acrylic", "veneer", "melamine", "wood", "aluminium", "aluminum",
    "laser", "pmma",
];

/// Id of the synthetic entry returned when the catalog offers nothing.
pub const SYNTHETIC_ID: &str = DEFAULT_MATERIAL_ID;

fn same_thickness(a: f64, b: f64) -> bool {
    (a - b).abs() < THICKNESS_TOLERANCE_MM
}

/// Overlap of two keyword sets: |A ∩ B| / max(|A|, |B|), 0 when either is empty.
fn keyword_overlap(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set_b: HashSet<&String> = b.iter().collect();
    let shared = a.iter().filter(|k| set_b.contains(k)).count() as f64;
    shared / a.len().max(b.len()) as f64
}

struct IndexedMaterial {
    def: MaterialDef,
    normalized_name: String,
}

struct IndexedEdgeband {
    def: EdgebandDef,
    normalized_name: String,
    keywords: Vec<String>,
}

/// Aggregate outcome of `apply_matches`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchStats {
    pub parts: usize,
    pub materials_matched: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub keyword: usize,
    pub thickness: usize,
    pub fallback: usize,
    pub edges_resolved: usize,
    pub edges_unresolved: usize,
    pub avg_material_confidence: f64,
}

// ==========================================
// MatcherContext
// ==========================================
/// Catalog snapshot of one organization, indexed for matching.
/// Built once per session and read-only afterwards.
pub struct MatcherContext {
    org_id: String,
    materials: Vec<IndexedMaterial>,
    edgebands: Vec<IndexedEdgeband>,
    defaults: OrgDefaults,
    material_by_name: HashMap<String, usize>,
    material_by_keyword: HashMap<String, usize>,
    edgeband_by_name: HashMap<String, usize>,
}

impl MatcherContext {
    /// Load active catalog entries and org defaults, then build indexes.
    #[instrument(skip(catalog, settings))]
    pub async fn load(
        catalog: &dyn CatalogRepository,
        settings: &dyn OrgSettingsReader,
        org_id: &str,
    ) -> RepositoryResult<Self> {
        let (materials, edgebands, defaults) = futures::try_join!(
            catalog.list_active_materials(org_id),
            catalog.list_active_edgebands(org_id),
            settings.get_org_defaults(org_id),
        )?;
        info!(
            materials = materials.len(),
            edgebands = edgebands.len(),
            "matcher context loaded"
        );
        Ok(Self::from_catalog(org_id, materials, edgebands, defaults))
    }

    /// Build from in-memory catalog data.
    pub fn from_catalog(
        org_id: &str,
        materials: Vec<MaterialDef>,
        edgebands: Vec<EdgebandDef>,
        defaults: OrgDefaults,
    ) -> Self {
        let mut material_by_name = HashMap::new();
        let mut material_by_keyword = HashMap::new();
        let materials: Vec<IndexedMaterial> = materials
            .into_iter()
            .enumerate()
            .map(|(idx, def)| {
                let normalized_name = normalize_text(&def.name);
                material_by_name.entry(normalized_name.clone()).or_insert(idx);
                if let Some(sku) = def.sku.as_deref().map(normalize_text).filter(|s| !s.is_empty()) {
                    material_by_name.entry(sku).or_insert(idx);
                }
                let mut keywords = extract_keywords(&def.name);
                if let Some(sku) = &def.sku {
                    keywords.extend(extract_keywords(sku));
                }
                for kw in keywords {
                    material_by_keyword.entry(kw).or_insert(idx);
                }
                IndexedMaterial {
                    def,
                    normalized_name,
                }
            })
            .collect();

        let mut edgeband_by_name = HashMap::new();
        let edgebands: Vec<IndexedEdgeband> = edgebands
            .into_iter()
            .enumerate()
            .map(|(idx, def)| {
                let normalized_name = normalize_text(&def.name);
                edgeband_by_name.entry(normalized_name.clone()).or_insert(idx);
                if let Some(sku) = def.sku.as_deref().map(normalize_text).filter(|s| !s.is_empty()) {
                    edgeband_by_name.entry(sku).or_insert(idx);
                }
                let mut keywords = extract_keywords(&def.name);
                if let Some(sku) = &def.sku {
                    keywords.extend(extract_keywords(sku));
                }
                for token in normalized_name.split(' ') {
                    if EDGEBAND_TYPES.contains(&token) && !keywords.iter().any(|k| k == token) {
                        keywords.push(token.to_string());
                    }
                }
                IndexedEdgeband {
                    def,
                    normalized_name,
                    keywords,
                }
            })
            .collect();

        Self {
            org_id: org_id.to_string(),
            materials,
            edgebands,
            defaults,
            material_by_name,
            material_by_keyword,
            edgeband_by_name,
        }
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    pub fn defaults(&self) -> &OrgDefaults {
        &self.defaults
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn edgeband_count(&self) -> usize {
        self.edgebands.len()
    }

    /// Ids of catalog materials with a visible grain direction.
    pub fn grained_material_ids(&self) -> Vec<String> {
        self.materials
            .iter()
            .filter(|m| m.def.grained)
            .map(|m| m.def.material_id.clone())
            .collect()
    }

    pub fn material(&self, material_id: &str) -> Option<&MaterialDef> {
        self.materials
            .iter()
            .map(|m| &m.def)
            .find(|m| m.material_id == material_id)
    }

    // ==========================================
    // Material ladder
    // ==========================================

    fn material_result(
        &self,
        idx: usize,
        confidence: f64,
        match_type: MatchType,
        matched_on: &str,
    ) -> MatchResult {
        let def = &self.materials[idx].def;
        MatchResult {
            id: def.material_id.clone(),
            name: def.name.clone(),
            confidence: clamp_confidence(confidence),
            match_type,
            matched_on: matched_on.to_string(),
        }
    }

    fn thickness_bonus(&self, idx: usize, thickness_mm: Option<f64>) -> f64 {
        match thickness_mm {
            Some(t) if same_thickness(self.materials[idx].def.thickness_mm, t) => THICKNESS_BONUS,
            _ => 0.0,
        }
    }

    /// Resolve raw material text (optionally with the part thickness).
    pub fn match_material(&self, raw: &str, thickness_mm: Option<f64>) -> MatchResult {
        let normalized = normalize_text(raw);
        if normalized.is_empty() {
            return self.material_fallback(raw);
        }

        // === exact name / sku ===
        if let Some(&idx) = self.material_by_name.get(&normalized) {
            let confidence = (EXACT_CONFIDENCE + self.thickness_bonus(idx, thickness_mm)).min(1.0);
            return self.material_result(idx, confidence, MatchType::Exact, raw);
        }

        // === fuzzy (first best wins) ===
        let mut best: Option<(usize, f64)> = None;
        for (idx, m) in self.materials.iter().enumerate() {
            let score = fuzzy_score(&normalized, &m.normalized_name);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        if let Some((idx, score)) = best.filter(|(_, s)| *s > FUZZY_MIN_SCORE) {
            let confidence = ((score * FUZZY_FACTOR).min(FUZZY_CAP)
                + self.thickness_bonus(idx, thickness_mm))
            .min(1.0);
            return self.material_result(idx, confidence, MatchType::Fuzzy, raw);
        }

        // === keyword owner ===
        for kw in extract_keywords(raw) {
            if let Some(&idx) = self.material_by_keyword.get(&kw) {
                let confidence =
                    (KEYWORD_CONFIDENCE + self.thickness_bonus(idx, thickness_mm)).min(1.0);
                return self.material_result(idx, confidence, MatchType::Keyword, &kw);
            }
        }

        // === unique thickness ===
        if let Some(t) = thickness_mm {
            let mut at_thickness = self
                .materials
                .iter()
                .enumerate()
                .filter(|(_, m)| same_thickness(m.def.thickness_mm, t));
            if let (Some((idx, _)), None) = (at_thickness.next(), at_thickness.next()) {
                return self.material_result(
                    idx,
                    THICKNESS_CONFIDENCE,
                    MatchType::Thickness,
                    &format!("{}mm", t),
                );
            }
        }

        self.material_fallback(raw)
    }

    /// Org default → first catalog material → synthetic "default".
    fn material_fallback(&self, raw: &str) -> MatchResult {
        if let Some(default_id) = &self.defaults.default_material_id {
            let name = self
                .material(default_id)
                .map(|m| m.name.clone())
                .unwrap_or_else(|| default_id.clone());
            return MatchResult {
                id: default_id.clone(),
                name,
                confidence: ORG_DEFAULT_CONFIDENCE,
                match_type: MatchType::Default,
                matched_on: raw.to_string(),
            };
        }
        if !self.materials.is_empty() {
            return self.material_result(0, FIRST_ENTRY_CONFIDENCE, MatchType::Default, raw);
        }
        MatchResult {
            id: SYNTHETIC_ID.to_string(),
            name: "Default material".to_string(),
            confidence: SYNTHETIC_CONFIDENCE,
            match_type: MatchType::Default,
            matched_on: raw.to_string(),
        }
    }

    // ==========================================
    // Edgeband ladder
    // ==========================================

    fn edgeband_result(
        &self,
        idx: usize,
        confidence: f64,
        match_type: MatchType,
        matched_on: &str,
    ) -> MatchResult {
        let def = &self.edgebands[idx].def;
        MatchResult {
            id: def.edgeband_id.clone(),
            name: def.name.clone(),
            confidence: clamp_confidence(confidence),
            match_type,
            matched_on: matched_on.to_string(),
        }
    }

    /// Correlation of an edgeband with a sheet material name.
    fn correlation_score(&self, eb: &IndexedEdgeband, material_name: &str, material_kw: &[String]) -> f64 {
        let fuzzy = fuzzy_score(material_name, &eb.normalized_name);
        let overlap = keyword_overlap(material_kw, &eb.keywords);
        let color = if shares_color_keyword(material_name, &eb.def.name) {
            1.0
        } else {
            0.0
        };
        0.4 * fuzzy + 0.3 * overlap + 0.3 * color
    }

    /// Resolve an edgeband by its own name, else by the sheet material it goes with.
    ///
    /// None only when the catalog has no edgebands and the org has no default.
    pub fn find_edgeband(&self, raw: Option<&str>, material_name: Option<&str>) -> Option<MatchResult> {
        // === by name ===
        if let Some(raw) = raw {
            let normalized = normalize_text(raw);
            if !normalized.is_empty() {
                if let Some(&idx) = self.edgeband_by_name.get(&normalized) {
                    return Some(self.edgeband_result(idx, EXACT_CONFIDENCE, MatchType::Exact, raw));
                }
                let mut best: Option<(usize, f64)> = None;
                for (idx, eb) in self.edgebands.iter().enumerate() {
                    let score = fuzzy_score(&normalized, &eb.normalized_name);
                    if best.map_or(true, |(_, s)| score > s) {
                        best = Some((idx, score));
                    }
                }
                if let Some((idx, score)) = best.filter(|(_, s)| *s > EDGEBAND_FUZZY_MIN_SCORE) {
                    return Some(self.edgeband_result(
                        idx,
                        score * FUZZY_FACTOR,
                        MatchType::Fuzzy,
                        raw,
                    ));
                }
            }
        }

        // === correlation with the sheet material ===
        if let Some(material_name) = material_name.filter(|m| !m.trim().is_empty()) {
            let material_kw = extract_keywords(material_name);
            let mut best: Option<(usize, f64)> = None;
            for (idx, eb) in self.edgebands.iter().enumerate() {
                let score = self.correlation_score(eb, material_name, &material_kw);
                if best.map_or(true, |(_, s)| score > s) {
                    best = Some((idx, score));
                }
            }
            if let Some((idx, score)) = best.filter(|(_, s)| *s > CORRELATION_MIN_SCORE) {
                return Some(self.edgeband_result(
                    idx,
                    score.min(CORRELATION_CAP),
                    MatchType::MaterialMatch,
                    material_name,
                ));
            }
        }

        // === fallbacks ===
        let matched_on = raw.or(material_name).unwrap_or("");
        if let Some(default_id) = &self.defaults.default_edgeband_id {
            let name = self
                .edgebands
                .iter()
                .find(|eb| &eb.def.edgeband_id == default_id)
                .map(|eb| eb.def.name.clone())
                .unwrap_or_else(|| default_id.clone());
            return Some(MatchResult {
                id: default_id.clone(),
                name,
                confidence: ORG_DEFAULT_CONFIDENCE,
                match_type: MatchType::Default,
                matched_on: matched_on.to_string(),
            });
        }
        if !self.edgebands.is_empty() {
            return Some(self.edgeband_result(
                0,
                FIRST_ENTRY_CONFIDENCE,
                MatchType::Default,
                matched_on,
            ));
        }
        None
    }

    /// Total variant of `find_edgeband`: synthetic "default" at 0.1 when nothing is found.
    pub fn match_edgeband(&self, raw: Option<&str>, material_name: Option<&str>) -> MatchResult {
        self.find_edgeband(raw, material_name)
            .unwrap_or_else(|| MatchResult {
                id: SYNTHETIC_ID.to_string(),
                name: "Default edgeband".to_string(),
                confidence: SYNTHETIC_CONFIDENCE,
                match_type: MatchType::Default,
                matched_on: raw.or(material_name).unwrap_or("").to_string(),
            })
    }

    // ==========================================
    // Batch application
    // ==========================================

    /// Resolve materials (parts with a material hint), then every pending edge.
    ///
    /// - part confidence becomes min(parse confidence, material match confidence)
    /// - edges are resolved against the resolved material name
    /// - edges with nothing to resolve to stay pending and are counted as unresolved
    #[instrument(skip(self, parts), fields(org_id = %self.org_id, parts = parts.len()))]
    pub fn apply_matches(&self, parts: &mut [CutPart]) -> MatchStats {
        let mut stats = MatchStats {
            parts: parts.len(),
            ..Default::default()
        };
        let mut confidence_sum = 0.0;

        for part in parts.iter_mut() {
            // === material ===
            if let Some(hint) = part.material_hint.clone() {
                let result = self.match_material(&hint, Some(part.thickness_mm));
                debug!(
                    part_id = %part.part_id,
                    hint = %hint,
                    material_id = %result.id,
                    match_type = %result.match_type,
                    confidence = result.confidence,
                    "material matched"
                );
                match result.match_type {
                    MatchType::Exact => stats.exact += 1,
                    MatchType::Fuzzy => stats.fuzzy += 1,
                    MatchType::Keyword => stats.keyword += 1,
                    MatchType::Thickness => stats.thickness += 1,
                    MatchType::Default | MatchType::MaterialMatch => stats.fallback += 1,
                }
                stats.materials_matched += 1;
                confidence_sum += result.confidence;

                part.material_id = result.id.clone();
                let merged = part.audit.confidence.min(result.confidence);
                part.audit.set_confidence(merged);
                part.audit.material_match = Some(result);
            }

            // === edges ===
            let material_name = self
                .material(&part.material_id)
                .map(|m| m.name.clone())
                .or_else(|| part.material_hint.clone());
            let Some(ops) = part.ops.as_mut() else {
                continue;
            };
            let Some(edging) = ops.edging.as_mut() else {
                continue;
            };
            let pending = edging
                .edges
                .values()
                .filter(|s| s.apply && s.edgeband_id.is_none())
                .count();
            if pending == 0 {
                continue;
            }
            match self.find_edgeband(edging.edgeband_hint.as_deref(), material_name.as_deref()) {
                Some(result) => {
                    for spec in edging.edges.values_mut() {
                        if spec.apply && spec.edgeband_id.is_none() {
                            spec.edgeband_id = Some(result.id.clone());
                        }
                    }
                    stats.edges_resolved += pending;
                }
                None => stats.edges_unresolved += pending,
            }
        }

        if stats.materials_matched > 0 {
            stats.avg_material_confidence = confidence_sum / stats.materials_matched as f64;
        }
        info!(
            parts = stats.parts,
            materials_matched = stats.materials_matched,
            exact = stats.exact,
            fuzzy = stats.fuzzy,
            keyword = stats.keyword,
            fallback = stats.fallback,
            edges_resolved = stats.edges_resolved,
            edges_unresolved = stats.edges_unresolved,
            "matches applied"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::part::{EdgeSpec, PartAudit, PartSize};
    use crate::domain::types::{EdgeId, SourceMethod};

    fn catalog() -> MatcherContext {
        let mut white = MaterialDef::new("m-white", "White Melamine", 18.0);
        white.sku = Some("WM-18".to_string());
        let oak = MaterialDef::new("m-oak", "Oak Veneer MDF", 19.0);
        let black = MaterialDef::new("m-black", "Black Gloss Acrylic", 22.0);
        let eb_white = EdgebandDef::new("e-white", "White ABS 1mm", 1.0, 22.0);
        let eb_oak = EdgebandDef::new("e-oak", "Oak Veneer Edge", 0.6, 22.0);
        MatcherContext::from_catalog(
            "org1",
            vec![white, oak, black],
            vec![eb_white, eb_oak],
            OrgDefaults::default(),
        )
    }

    fn empty() -> MatcherContext {
        MatcherContext::from_catalog("org1", vec![], vec![], OrgDefaults::default())
    }

    #[test]
    fn test_exact_match_with_thickness_bonus() {
        let ctx = catalog();
        let r = ctx.match_material("white melamine", Some(18.0));
        assert_eq!(r.id, "m-white");
        assert_eq!(r.match_type, MatchType::Exact);
        assert!((r.confidence - 1.0).abs() < 1e-9);

        let r = ctx.match_material("WHITE MELAMINE", Some(16.0));
        assert!((r.confidence - 0.95).abs() < 1e-9);

        let r = ctx.match_material("wm-18", None);
        assert_eq!(r.id, "m-white");
        assert_eq!(r.match_type, MatchType::Exact);
    }

    #[test]
    fn test_fuzzy_match() {
        let ctx = catalog();
        // containment: "oak veneer mdf" contains "oak veneer"
        let r = ctx.match_material("Oak Veneer", None);
        assert_eq!(r.id, "m-oak");
        assert_eq!(r.match_type, MatchType::Fuzzy);
        assert!(r.confidence <= 0.9 && r.confidence > 0.7);
    }

    #[test]
    fn test_keyword_match() {
        let ctx = catalog();
        let r = ctx.match_material("acrylic door stock", None);
        assert_eq!(r.id, "m-black");
        assert_eq!(r.match_type, MatchType::Keyword);
        assert!((r.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_thickness_match() {
        let ctx = catalog();
        let r = ctx.match_material("something odd", Some(22.0));
        assert_eq!(r.id, "m-black");
        assert_eq!(r.match_type, MatchType::Thickness);
        assert!((r.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_fallback_ladder() {
        let ctx = catalog();
        let r = ctx.match_material("zzz", None);
        assert_eq!(r.id, "m-white");
        assert_eq!(r.match_type, MatchType::Default);
        assert!((r.confidence - 0.3).abs() < 1e-9);

        let with_default = MatcherContext::from_catalog(
            "org1",
            vec![MaterialDef::new("m1", "Birch Ply", 18.0)],
            vec![],
            OrgDefaults {
                default_material_id: Some("m1".to_string()),
                default_edgeband_id: None,
            },
        );
        let r = with_default.match_material("", None);
        assert_eq!(r.id, "m1");
        assert_eq!(r.name, "Birch Ply");
        assert!((r.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_monotonic_ladder() {
        let ctx = catalog();
        let exact = ctx.match_material("Oak Veneer MDF", None).confidence;
        let fuzzy = ctx.match_material("Oak Veneer", None).confidence;
        let keyword = ctx.match_material("acrylic panel", None).confidence;
        let default = ctx.match_material("zzz", None).confidence;
        assert!(exact > fuzzy && fuzzy > keyword && keyword > default);
    }

    #[test]
    fn test_matcher_total_on_empty_catalog() {
        let ctx = empty();
        for raw in ["", "white", "oak veneer"] {
            let r = ctx.match_material(raw, Some(18.0));
            assert_eq!(r.id, SYNTHETIC_ID);
            assert!((r.confidence - 0.1).abs() < 1e-9);
            assert!(r.confidence >= 0.0 && r.confidence <= 1.0);
        }
        assert!(ctx.find_edgeband(Some("white abs"), Some("White")).is_none());
        let eb = ctx.match_edgeband(Some("white abs"), Some("White"));
        assert_eq!(eb.id, SYNTHETIC_ID);
        assert!((eb.confidence - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_edgeband_by_name_and_correlation() {
        let ctx = catalog();
        let r = ctx.find_edgeband(Some("white abs 1mm"), None).unwrap();
        assert_eq!(r.id, "e-white");
        assert_eq!(r.match_type, MatchType::Exact);

        let r = ctx.find_edgeband(None, Some("White Melamine")).unwrap();
        assert_eq!(r.id, "e-white");
        assert_eq!(r.match_type, MatchType::MaterialMatch);
        assert!(r.confidence > 0.4 && r.confidence <= 0.85);

        let r = ctx.find_edgeband(None, Some("Oak Veneer MDF")).unwrap();
        assert_eq!(r.id, "e-oak");
    }

    #[test]
    fn test_edgeband_fallback_first() {
        let ctx = catalog();
        let r = ctx.find_edgeband(None, Some("Concrete Grey")).unwrap();
        assert_eq!(r.id, "e-white");
        assert_eq!(r.match_type, MatchType::Default);
        assert!((r.confidence - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_apply_matches() {
        let ctx = catalog();
        let mut part = CutPart::draft(
            PartSize::new(720.0, 560.0),
            18.0,
            DEFAULT_MATERIAL_ID,
            PartAudit::new(SourceMethod::PasteParser, None, 0.98),
        );
        part.material_hint = Some("white carcass".to_string());
        part.edging_mut().edges.insert(EdgeId::L1, EdgeSpec::pending());
        part.edging_mut().edges.insert(EdgeId::L2, EdgeSpec::pending());

        let mut untouched = part.clone();
        untouched.material_hint = None;
        untouched.ops = None;

        let mut parts = vec![part, untouched];
        let stats = ctx.apply_matches(&mut parts);

        assert_eq!(stats.parts, 2);
        assert_eq!(stats.materials_matched, 1);
        assert_eq!(stats.keyword, 1);
        assert_eq!(stats.edges_resolved, 2);

        let matched = &parts[0];
        assert_eq!(matched.material_id, "m-white");
        assert!((matched.audit.confidence - 0.75).abs() < 1e-9);
        let edging = matched.edging().unwrap();
        assert_eq!(edging.edges[&EdgeId::L1].edgeband_id.as_deref(), Some("e-white"));
        assert!(matched.audit.material_match.is_some());

        assert_eq!(parts[1].material_id, DEFAULT_MATERIAL_ID);
        assert!((parts[1].audit.confidence - 0.98).abs() < 1e-9);
    }

    #[test]
    fn test_apply_matches_unresolved_edges_on_empty_catalog() {
        let ctx = empty();
        let mut part = CutPart::draft(
            PartSize::new(720.0, 560.0),
            18.0,
            DEFAULT_MATERIAL_ID,
            PartAudit::new(SourceMethod::Manual, None, 1.0),
        );
        part.edging_mut().edges.insert(EdgeId::W1, EdgeSpec::pending());
        let mut parts = vec![part];
        let stats = ctx.apply_matches(&mut parts);
        assert_eq!(stats.edges_unresolved, 1);
        assert!(parts[0].edging().unwrap().edges[&EdgeId::W1].edgeband_id.is_none());
    }
}
