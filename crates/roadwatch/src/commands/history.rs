use roadwatch_core::{LocationKey, LocationMemory};
use roadwatch_telemetry::Paths;

pub fn run(location: &str, limit: usize) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    println!("{}", render(&paths, location, limit)?);
    Ok(())
}

fn render(paths: &Paths, location: &str, limit: usize) -> anyhow::Result<String> {
    let config = super::load_config(paths)?;
    let key = LocationKey::parse(location, config.location_precision)?;
    let memory = super::open_memory(paths)?;
    let records = memory.history(&key, limit)?;

    if records.is_empty() {
        return Ok(format!("No reports for {}", key));
    }

    let mut lines = vec![
        format!("Reports for {} (newest {})", key, records.len()),
        "=".repeat(40),
    ];
    lines.extend(records.iter().map(super::format_record));
    Ok(lines.join("\n"))
}
