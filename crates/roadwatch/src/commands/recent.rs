use roadwatch_core::LocationMemory;
use roadwatch_telemetry::Paths;

pub fn run(limit: usize) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let memory = super::open_memory(&paths)?;
    let records = memory.recent(limit)?;

    if records.is_empty() {
        println!("No reports stored");
        return Ok(());
    }

    println!("Recent Reports (last {})", records.len());
    println!("========================");
    for record in &records {
        println!("{}", super::format_record(record));
    }
    Ok(())
}
