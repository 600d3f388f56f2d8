use roadwatch_telemetry::{read_jsonl, Paths, RunRecord};
use std::collections::BTreeMap;

const OUTCOMES: [&str; 4] = ["REPORTED", "SUPPRESSED", "LOW_PRIORITY", "ABORTED"];

fn compute_stats(runs: &[RunRecord]) -> String {
    if runs.is_empty() {
        return "No runs to analyze.".to_string();
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for run in runs {
        *counts.entry(run.outcome.as_str()).or_default() += 1;
    }
    let store_warnings = runs.iter().filter(|r| r.store_warning.is_some()).count();

    let mut lines = vec![format!("Total runs: {}", runs.len())];
    for outcome in OUTCOMES {
        lines.push(format!(
            "  {:<13} {}",
            outcome,
            counts.get(outcome).copied().unwrap_or(0)
        ));
    }
    if store_warnings > 0 {
        lines.push(format!("Reports not saved: {}", store_warnings));
    }
    lines.join("\n")
}

fn format_run(run: &RunRecord) -> String {
    format!(
        "  {} | {:<12} | {:<6} | {} | {}",
        run.timestamp.format("%Y-%m-%d %H:%M"),
        run.outcome,
        run.severity.as_deref().unwrap_or("-"),
        run.location,
        run.image,
    )
}

pub fn run(stats: bool, limit: usize) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let runs: Vec<RunRecord> = read_jsonl(&paths.runs_file())?;

    if runs.is_empty() {
        println!("No run history");
        return Ok(());
    }

    if stats {
        println!("{}", compute_stats(&runs));
        return Ok(());
    }

    let display_runs: Vec<_> = runs.iter().rev().take(limit).collect();
    println!("Recent Runs (last {})", display_runs.len());
    println!("=====================");
    for run in display_runs {
        println!("{}", format_run(run));
    }
    Ok(())
}
