use chrono::Utc;
use roadwatch_core::{LocationKey, LocationMemory};
use roadwatch_telemetry::Paths;

pub fn run(location: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    println!("{}", render(&paths, location)?);
    Ok(())
}

fn render(paths: &Paths, location: &str) -> anyhow::Result<String> {
    let config = super::load_config(paths)?;
    let key = LocationKey::parse(location, config.location_precision)?;
    let memory = super::open_memory(paths)?;

    let now = Utc::now();
    let window = config.recency_window();
    if !memory.was_reported_within(&key, window, now) {
        return Ok(format!(
            "{} not reported in the last {} days, a new report would be sent",
            key, config.recency_days
        ));
    }

    let last = memory
        .last_reported_after(&key, now - window)
        .ok()
        .flatten()
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    Ok(format!(
        "{} already reported (last {}), duplicates are suppressed for {} days",
        key, last, config.recency_days
    ))
}
