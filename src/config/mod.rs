// ==========================================
// Cutlist Intake - Configuration Layer
// ==========================================
// Scope: parser options, validation thresholds, pipeline config,
//        org-scoped overrides (config_kv table)
// ==========================================

pub mod config_manager;
pub mod intake_config;
pub mod org_settings_trait;
pub mod parse_options;
pub mod validation_config;

pub use config_manager::{config_keys, ConfigManager, GLOBAL_SCOPE};
pub use intake_config::IntakeConfig;
pub use org_settings_trait::OrgSettingsReader;
pub use parse_options::{
    TabularParseOptions, TextParseOptions, DEFAULT_MIN_CONFIDENCE, DEFAULT_THICKNESS_MM,
};
pub use validation_config::{CutlistValidationConfig, PartValidationConfig, SheetSize};
