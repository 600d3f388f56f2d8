//! Alert channel trait and shared helpers

use chrono::{DateTime, Utc};
use roadwatch_core::{Category, Detection, FindingSet, LocationKey, Outcome, PipelineState, Severity};
use std::path::Path;

/// Everything a channel needs from a finished run
#[derive(Debug, Clone)]
pub struct AlertInput {
    pub outcome: Outcome,
    pub location: LocationKey,
    pub image_reference: String,
    pub hazards: Detection,
    pub signage: Detection,
    pub severity: Option<Severity>,
    pub generated_at: DateTime<Utc>,
}

impl AlertInput {
    /// Snapshot a finished run; None while stages remain
    pub fn from_state(state: &PipelineState, generated_at: DateTime<Utc>) -> Option<Self> {
        let outcome = state.outcome()?;
        Some(Self {
            outcome,
            location: state.observation.location.clone(),
            image_reference: state.observation.image_reference.clone(),
            hazards: state
                .hazard_findings
                .clone()
                .unwrap_or_else(|| Detection::Found(FindingSet::empty(Category::Hazard))),
            signage: state
                .signage_findings
                .clone()
                .unwrap_or_else(|| Detection::Found(FindingSet::empty(Category::Signage))),
            severity: state.severity,
            generated_at,
        })
    }

    /// `Hazards: ... | Signs: ...`
    pub fn findings_summary(&self) -> String {
        format!("{} | {}", self.hazards.render(), self.signage.render())
    }
}

/// Check `alerts.enabled.<name>` in config.json
///
/// Channels are enabled unless the file explicitly sets them to false. An
/// unreadable or malformed file leaves every channel enabled.
pub fn is_channel_enabled(config_file: &Path, name: &str) -> bool {
    let contents = match std::fs::read_to_string(config_file) {
        Ok(contents) => contents,
        Err(_) => return true,
    };

    match serde_json::from_str::<serde_json::Value>(&contents) {
        Ok(config) => config
            .get("alerts")
            .and_then(|a| a.get("enabled"))
            .and_then(|e| e.get(name))
            .and_then(|v| v.as_bool())
            .unwrap_or(true),
        Err(_) => true,
    }
}

/// A destination for post-run alerts
pub trait AlertChannel: Send + Sync {
    /// Channel name, also its key under `alerts.enabled`
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Called once for each REPORTED run. Returns the rendered alert, if any.
    fn on_reported(&mut self, input: &AlertInput) -> Option<String>;
}
