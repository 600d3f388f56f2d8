//! Plain-text report rendering

use crate::state::PipelineState;
use chrono::{DateTime, Utc};

const WIDTH: usize = 60;

/// Render the structured report for a run that reached Reporting
pub fn render_report(state: &PipelineState, generated_at: DateTime<Utc>) -> String {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let observation = &state.observation;

    let mut lines = vec![
        heavy.clone(),
        "ROADWATCH HAZARD REPORT".to_string(),
        heavy.clone(),
        format!("Timestamp: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        format!("Location: {}", observation.location),
        format!("Image Source: {}", observation.image_reference),
        format!(
            "Severity: {}",
            state.severity.map(|s| s.as_str()).unwrap_or("UNASSESSED")
        ),
        light.clone(),
        "DETECTION RESULTS:".to_string(),
        state.hazards_summary(),
        state.signs_summary(),
        light,
        "AUDIT LOG:".to_string(),
    ];
    lines.extend(state.audit_log.iter().map(|entry| format!("  • {}", entry)));
    lines.push(heavy);

    lines.join("\n")
}
