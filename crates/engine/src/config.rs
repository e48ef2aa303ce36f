use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::export::ExportFormat;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV_VAR: &str = "PROGRAMME_ENGINE_CONFIG";

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Tunables for turning triggers into schedule changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    /// Variations of category `other` only affect the schedule above this value.
    pub variation_value_threshold: f64,
    /// Monetary value that corresponds to one day of impact.
    pub value_per_impact_day: f64,
    /// Duration cut applied when a risk notice recommends acceleration.
    pub risk_acceleration_fraction: f64,
    /// Duration cut applied when a resource is upgraded.
    pub upgrade_acceleration_fraction: f64,
    /// Work-area terms looked for in trigger text.
    pub work_area_vocabulary: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            variation_value_threshold: 10_000.0,
            value_per_impact_day: 10_000.0,
            risk_acceleration_fraction: 0.2,
            upgrade_acceleration_fraction: 0.1,
            work_area_vocabulary: [
                "foundation",
                "excavation",
                "concrete",
                "steel",
                "framing",
                "roofing",
                "drainage",
                "electrical",
                "plumbing",
                "mechanical",
                "facade",
                "landscaping",
                "paving",
                "earthworks",
                "piling",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// How the CPM backward pass derives latest finish dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackwardPassMode {
    /// Every activity's latest finish is the project finish. Relationships are
    /// ignored, so any activity finishing before the project end has float.
    ProjectFinish,
    /// Latest finish is constrained by successors through each relationship
    /// type and lag, walked in reverse topological order.
    #[default]
    Relationships,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CpmOptions {
    pub backward_pass: BackwardPassMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    /// Root directory; artifacts land in `<directory>/<project_id>/`.
    pub directory: PathBuf,
    pub default_formats: Vec<ExportFormat>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            directory: PathBuf::from("exports"),
            default_formats: vec![ExportFormat::Xml, ExportFormat::Xer],
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub analyzer: AnalyzerConfig,
    pub cpm: CpmOptions,
    pub export: ExportConfig,
    /// Upper bound on a single change run, in seconds. Clamped to one day.
    pub run_timeout_secs: u64,
}

const MAX_RUN_TIMEOUT_SECS: u64 = 24 * 60 * 60;

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            analyzer: AnalyzerConfig::default(),
            cpm: CpmOptions::default(),
            export: ExportConfig::default(),
            run_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_secs.min(MAX_RUN_TIMEOUT_SECS))
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Load from the file named by `PROGRAMME_ENGINE_CONFIG`, or defaults when
    /// the variable is unset.
    pub fn from_env() -> Result<Self, EngineError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = EngineConfig::from_json(
            r#"{"cpm":{"backwardPass":"project_finish"},"runTimeoutSecs":5}"#,
        )
        .unwrap();
        assert_eq!(cfg.cpm.backward_pass, BackwardPassMode::ProjectFinish);
        assert_eq!(cfg.run_timeout(), Duration::from_secs(5));

        let huge = EngineConfig::from_json(r#"{"runTimeoutSecs":18446744073709551615}"#).unwrap();
        assert_eq!(huge.run_timeout(), Duration::from_secs(86_400));
        assert_eq!(cfg.analyzer, AnalyzerConfig::default());
        assert_eq!(cfg.export.default_formats.len(), 2);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
