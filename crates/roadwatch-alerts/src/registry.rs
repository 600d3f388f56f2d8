//! Alert registry: holds enabled channels and fans a finished run out to them

use crate::base::{is_channel_enabled, AlertChannel, AlertInput};
use crate::voice::{alert_text, sign_advisory};
use roadwatch_core::{LocationKey, Outcome};
use std::path::PathBuf;
use tracing::debug;

/// Notice emitted instead of alerts when a run was suppressed
pub fn duplicate_notice(location: &LocationKey) -> String {
    format!(
        "MEMORY: {} was already reported recently, duplicate notification skipped",
        location
    )
}

/// Registry for alert channels
pub struct AlertRegistry {
    channels: Vec<Box<dyn AlertChannel>>,
    config_file: Option<PathBuf>,
}

impl AlertRegistry {
    /// Registry that accepts every channel
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
            config_file: None,
        }
    }

    /// Registry that honours `alerts.enabled` in the given config.json
    pub fn with_config(config_file: impl Into<PathBuf>) -> Self {
        Self {
            channels: Vec::new(),
            config_file: Some(config_file.into()),
        }
    }

    /// Register a channel; returns false if config disables it
    pub fn register(&mut self, channel: Box<dyn AlertChannel>) -> bool {
        if let Some(config) = &self.config_file {
            if !is_channel_enabled(config, channel.name()) {
                debug!(channel = channel.name(), "alert channel disabled");
                return false;
            }
        }
        self.channels.push(channel);
        true
    }

    /// Dispatch one finished run.
    ///
    /// Channels only fire for REPORTED runs. A SUPPRESSED run with hazards
    /// yields the duplicate notice. A run that was not reported and saw only
    /// signage yields a road-sign advisory. Anything else yields nothing.
    pub fn dispatch(&mut self, input: &AlertInput) -> Vec<String> {
        match input.outcome {
            Outcome::Reported => self
                .channels
                .iter_mut()
                .filter_map(|c| c.on_reported(input))
                .collect(),
            Outcome::Suppressed if input.hazards.has_findings() => {
                vec![duplicate_notice(&input.location)]
            }
            Outcome::Suppressed | Outcome::LowPriority => sign_advisory(&input.signage)
                .map(|advisory| {
                    format!(
                        "ROAD SIGN ADVISORY: {}",
                        alert_text(advisory.phrase, advisory.level)
                    )
                })
                .into_iter()
                .collect(),
            Outcome::Aborted => Vec::new(),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl Default for AlertRegistry {
    fn default() -> Self {
        Self::new()
    }
}
