// ==========================================
// Cutlist Intake - Pipeline Configuration
// ==========================================
// Scope: everything IntakePipeline needs, with documented defaults
// Layers: built-in defaults → org overrides (OrgSettingsReader)
// ==========================================

use crate::config::org_settings_trait::OrgSettingsReader;
use crate::config::parse_options::{TabularParseOptions, TextParseOptions, DEFAULT_MIN_CONFIDENCE};
use crate::config::validation_config::CutlistValidationConfig;
use crate::domain::part::clamp_confidence;
use crate::repository::error::RepositoryResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    pub text: TextParseOptions,
    pub tabular: TabularParseOptions,
    pub validation: CutlistValidationConfig,
    /// Parts below this confidence go to review (default 0.6)
    pub min_confidence: f64,
    /// Pick the best worksheet instead of the first (default true)
    pub auto_select_sheet: bool,
    /// Write accepted parts through the part sink (default true)
    pub persist_accepted: bool,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            text: TextParseOptions::default(),
            tabular: TabularParseOptions::default(),
            validation: CutlistValidationConfig::default(),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            auto_select_sheet: true,
            persist_accepted: true,
        }
    }
}

impl IntakeConfig {
    /// Apply organization overrides on top of `self`.
    ///
    /// - default material id → both parser option sets
    /// - standard sheet / allowed thicknesses → part validation
    /// - min confidence → review threshold
    pub async fn with_org_settings(
        mut self,
        reader: &dyn OrgSettingsReader,
        org_id: &str,
    ) -> RepositoryResult<Self> {
        let defaults = reader.get_org_defaults(org_id).await?;
        if let Some(material_id) = defaults.default_material_id {
            self.text.default_material_id = Some(material_id.clone());
            self.tabular.default_material_id = Some(material_id);
        }

        self.validation.part.standard_sheet = reader.get_standard_sheet(org_id).await?;

        if let Some(thicknesses) = reader.get_allowed_thicknesses(org_id).await? {
            self.validation.part.allowed_thicknesses_mm = thicknesses;
        }

        if let Some(min_confidence) = reader.get_min_confidence(org_id).await? {
            self.min_confidence = clamp_confidence(min_confidence);
            self.text.min_confidence = self.min_confidence;
        }

        debug!(org_id, min_confidence = self.min_confidence, "org settings applied");
        Ok(self)
    }
}
