use roadwatch_core::PipelineConfig;
use roadwatch_telemetry::Paths;

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let wrote_config = init_at(&paths)?;

    println!("✓ Data directory: {}", paths.data_dir.display());
    if wrote_config {
        println!("✓ Wrote default config: {}", paths.config_file().display());
    } else {
        println!("✓ Kept existing config: {}", paths.config_file().display());
    }
    println!("✓ Memory store: {}", paths.memory_db().display());
    Ok(())
}

/// Returns true if a default config.json was written
fn init_at(paths: &Paths) -> anyhow::Result<bool> {
    paths.ensure_data_dir()?;

    let config_path = paths.config_file();
    let wrote_config = if config_path.exists() {
        // Fail early on a config the pipeline would reject
        super::load_config(paths)?;
        false
    } else {
        let config = serde_json::json!({
            "pipeline": PipelineConfig::default(),
            "alerts": {
                "enabled": {
                    "authority": true,
                    "voice": true
                }
            }
        });
        let json = serde_json::to_string_pretty(&config)?;
        roadwatch_telemetry::atomic_write(&config_path, json.as_bytes())?;
        true
    };

    super::open_memory(paths)?;
    Ok(wrote_config)
}
