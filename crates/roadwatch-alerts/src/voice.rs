//! Driver-facing voice alerts

use crate::base::{AlertChannel, AlertInput};
use roadwatch_core::{Detection, Severity};
use tracing::info;

fn lead_word(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "Caution",
        Severity::Medium => "Warning",
        Severity::High => "Danger",
    }
}

/// Short spoken alert, e.g. `Danger. Road hazard detected. Use caution.`
pub fn alert_text(hazard: &str, severity: Severity) -> String {
    let hazard = hazard.trim().trim_end_matches('.');
    match severity {
        Severity::Low => format!("{}. {}.", lead_word(severity), hazard),
        Severity::Medium => format!("{}. {} ahead.", lead_word(severity), hazard),
        Severity::High => format!("{}. {}. Use caution.", lead_word(severity), hazard),
    }
}

/// Informational phrase for a recognised road sign
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignAdvisory {
    pub level: Severity,
    pub phrase: &'static str,
}

/// Pick an advisory for the most specific sign seen, None without signage
pub fn sign_advisory(signage: &Detection) -> Option<SignAdvisory> {
    let set = signage.findings().filter(|set| !set.is_empty())?;
    let labels = set
        .findings
        .iter()
        .map(|f| f.label.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let (level, phrase) = if labels.contains("hospital") {
        (Severity::Low, "Hospital zone ahead. Reduce speed and no horn zone")
    } else if labels.contains("school") {
        (Severity::Medium, "School zone ahead. Reduce speed and watch for children")
    } else if labels.contains("crossing") || labels.contains("pedestrian") {
        (Severity::Medium, "Pedestrian crossing ahead. Reduce speed and stay alert")
    } else if labels.contains("stop") {
        (Severity::Low, "Stop sign ahead. Prepare to stop")
    } else if labels.contains("yield") {
        (Severity::Low, "Yield sign ahead. Prepare to give way")
    } else {
        (Severity::Low, "Road sign detected. Stay alert")
    };

    Some(SignAdvisory { level, phrase })
}

/// Speaks a hazard alert, or a sign advisory for signage-only reports
#[derive(Default)]
pub struct VoiceNarrator {
    spoken: Vec<String>,
}

impl VoiceNarrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }
}

impl AlertChannel for VoiceNarrator {
    fn name(&self) -> &str {
        "voice"
    }

    fn description(&self) -> &str {
        "Spoken alert for the driver"
    }

    fn on_reported(&mut self, input: &AlertInput) -> Option<String> {
        let text = if input.hazards.has_findings() {
            alert_text(
                "Road hazard detected",
                input.severity.unwrap_or(Severity::High),
            )
        } else {
            let advisory = sign_advisory(&input.signage)?;
            alert_text(advisory.phrase, advisory.level)
        };

        info!(text = %text, "voice alert");
        self.spoken.push(text.clone());
        Some(format!("VOICE ALERT: {}", text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadwatch_core::{Category, Finding, FindingSet};

    fn signs(labels: &[&str]) -> Detection {
        Detection::Found(FindingSet::new(
            Category::Signage,
            labels.iter().map(|l| Finding::new(*l, 0.9)).collect(),
        ))
    }

    #[test]
    fn test_alert_text_by_severity() {
        assert_eq!(alert_text("Pothole", Severity::Low), "Caution. Pothole.");
        assert_eq!(alert_text("Pothole", Severity::Medium), "Warning. Pothole ahead.");
        assert_eq!(
            alert_text("Pothole.", Severity::High),
            "Danger. Pothole. Use caution."
        );
    }

    #[test]
    fn test_sign_advisory_priority() {
        // Hospital wins over the more generic crossing match
        let advisory = sign_advisory(&signs(&["pedestrian crossing", "Hospital"])).unwrap();
        assert!(advisory.phrase.starts_with("Hospital"));
        assert_eq!(advisory.level, Severity::Low);

        assert_eq!(
            sign_advisory(&signs(&["school_zone"])).unwrap().level,
            Severity::Medium
        );
        assert!(sign_advisory(&signs(&["STOP"])).unwrap().phrase.starts_with("Stop"));
        assert!(sign_advisory(&signs(&["yield"])).unwrap().phrase.starts_with("Yield"));
        assert_eq!(
            sign_advisory(&signs(&["speed_limit_50"])).unwrap().phrase,
            "Road sign detected. Stay alert"
        );
    }

    #[test]
    fn test_sign_advisory_needs_signage() {
        assert!(sign_advisory(&signs(&[])).is_none());
        let failed = Detection::TimedOut {
            category: Category::Signage,
        };
        assert!(sign_advisory(&failed).is_none());
    }
}
