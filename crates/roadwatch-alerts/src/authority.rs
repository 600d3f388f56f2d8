//! Authority notification: a copy-paste ready hazard report with the photo inlined

use crate::base::{AlertChannel, AlertInput};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use roadwatch_core::Severity;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SOURCE: &str = "roadwatch automated hazard monitor";

/// Report handed to a road maintenance authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorityReport {
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub location_link: String,
    pub findings: String,
    pub severity: Severity,
    /// Image bytes, base64 encoded; None when the image could not be read
    pub photo_base64: Option<String>,
    pub photo_status: String,
    pub source: String,
}

impl AuthorityReport {
    pub fn build(input: &AlertInput) -> Self {
        let (photo_base64, photo_status) = encode_photo(Path::new(&input.image_reference));
        let location = input.location.to_string();
        Self {
            timestamp: input.generated_at,
            location_link: maps_link(&location),
            location,
            findings: input.findings_summary(),
            // REPORTED runs always carry a tier; HIGH mirrors the assessor fallback
            severity: input.severity.unwrap_or(Severity::High),
            photo_base64,
            photo_status,
            source: SOURCE.to_string(),
        }
    }

    /// Plain-text message for chat or SMS
    pub fn message(&self) -> String {
        [
            "NEW ROAD HAZARD REPORTED".to_string(),
            format!("Location    : {}", self.location),
            format!("Map         : {}", self.location_link),
            format!("Severity    : {}", self.severity),
            format!("Details     : {}", self.findings),
            format!(
                "Timestamp   : {}",
                self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
            format!("Photo       : {}", self.photo_status),
            format!("Source      : {}", self.source),
        ]
        .join("\n")
    }
}

pub fn maps_link(location: &str) -> String {
    format!("https://maps.google.com/?q={}", location)
}

fn encode_photo(path: &Path) -> (Option<String>, String) {
    match std::fs::read(path) {
        Ok(bytes) => (
            Some(general_purpose::STANDARD.encode(&bytes)),
            "Attached (base64)".to_string(),
        ),
        Err(e) => (None, format!("Not attached: {}", e)),
    }
}

/// E-mail body for a report
pub fn authority_email(report: &AuthorityReport) -> String {
    let timestamp = report.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
    let photo_line = if report.photo_base64.is_some() {
        "A photo of the hazard is attached to this report."
    } else {
        "No photo could be attached to this report."
    };

    format!(
        "Subject: Road hazard detected ({} severity) at {}\n\
         \n\
         Dear Road Maintenance Authority,\n\
         \n\
         This is an automated report from the {}.\n\
         \n\
         HAZARD DETAILS\n\
         Severity: {}\n\
         Location: {}\n\
         Map: {}\n\
         Detection details: {}\n\
         Timestamp: {}\n\
         \n\
         {}\n\
         \n\
         Regards,\n\
         {}",
        report.severity,
        report.location,
        report.source,
        report.severity,
        report.location,
        report.location_link,
        report.findings,
        timestamp,
        photo_line,
        report.source,
    )
}

/// Builds an [`AuthorityReport`] for every reported run with hazards.
///
/// Signage-only reports are informational and are not forwarded. With an
/// outbox configured each report is also written there as JSON.
pub struct AuthorityNotifier {
    outbox: Option<PathBuf>,
    sent: Vec<AuthorityReport>,
}

impl AuthorityNotifier {
    pub fn new() -> Self {
        Self {
            outbox: None,
            sent: Vec::new(),
        }
    }

    pub fn with_outbox(mut self, dir: impl Into<PathBuf>) -> Self {
        self.outbox = Some(dir.into());
        self
    }

    /// Reports built so far, oldest first
    pub fn sent(&self) -> &[AuthorityReport] {
        &self.sent
    }

    fn save(dir: &Path, report: &AuthorityReport) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let stem: String = report
            .location
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        let path = dir.join(format!(
            "{}_{}.json",
            report.timestamp.format("%Y%m%dT%H%M%S%.6fZ"),
            stem
        ));
        let json = serde_json::to_string_pretty(report)?;
        roadwatch_telemetry::atomic_write(&path, json.as_bytes())?;
        Ok(path)
    }
}

impl Default for AuthorityNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertChannel for AuthorityNotifier {
    fn name(&self) -> &str {
        "authority"
    }

    fn description(&self) -> &str {
        "Hazard report for the road maintenance authority"
    }

    fn on_reported(&mut self, input: &AlertInput) -> Option<String> {
        if !input.hazards.has_findings() {
            return None;
        }

        let report = AuthorityReport::build(input);
        let mut message = report.message();

        if let Some(dir) = &self.outbox {
            match Self::save(dir, &report) {
                Ok(path) => {
                    info!(path = %path.display(), "authority report saved");
                    message.push_str(&format!("\nSaved       : {}", path.display()));
                }
                Err(e) => warn!(error = %e, "failed to save authority report"),
            }
        }

        self.sent.push(report);
        Some(message)
    }
}
