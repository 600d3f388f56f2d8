//! Configuration for the decision pipeline

use crate::error::ConfigError;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pipeline configuration, loaded from `config.json` in the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Repeat reports for the same location within this many days are suppressed
    pub recency_days: u32,

    /// Upper bound on one classifier call
    pub classifier_timeout_ms: u64,

    /// Upper bound on one severity assessment
    pub assessor_timeout_ms: u64,

    /// Decimal places kept when normalising `lat,lon` keys
    pub location_precision: u32,

    /// Findings below this confidence are dropped by Detection
    pub min_confidence: f64,

    /// Tier answered when no severity assessor is configured. Assessor
    /// failures always fall back to HIGH regardless of this value.
    pub default_severity: Severity,
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self {
            recency_days: 7,
            classifier_timeout_ms: 30_000,
            assessor_timeout_ms: 15_000,
            location_precision: 4,
            min_confidence: 0.25,
            default_severity: Severity::High,
        }
    }

    /// Load from a JSON file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        // config.json may carry other sections (e.g. "alerts"); take only ours
        let value: serde_json::Value = serde_json::from_str(contents)?;
        let pipeline = value.get("pipeline").cloned().unwrap_or(value);
        Ok(serde_json::from_value(pipeline)?)
    }

    pub fn recency_window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.recency_days))
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_millis(self.classifier_timeout_ms)
    }

    pub fn assessor_timeout(&self) -> Duration {
        Duration::from_millis(self.assessor_timeout_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::new();
        assert_eq!(config.recency_days, 7);
        assert_eq!(config.recency_window(), chrono::Duration::days(7));
        assert_eq!(config.default_severity, Severity::High);
        assert_eq!(config.location_precision, 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{"recency_days": 3}"#).unwrap();
        assert_eq!(config.recency_days, 3);
        assert_eq!(config.classifier_timeout_ms, 30_000);
    }

    #[test]
    fn test_nested_pipeline_section() {
        let json = r#"{"pipeline": {"min_confidence": 0.5}, "alerts": {"enabled": {"voice": false}}}"#;
        let config = PipelineConfig::from_json(json).unwrap();
        assert_eq!(config.min_confidence, 0.5);
        assert_eq!(config.recency_days, 7);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = PipelineConfig::load(&temp.path().join("config.json")).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            PipelineConfig::load(&path),
            Err(ConfigError::Json(_))
        ));
    }
}
