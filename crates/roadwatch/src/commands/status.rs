use roadwatch_core::LocationMemory;
use roadwatch_telemetry::{read_jsonl, Paths, RunRecord};

pub fn run() -> anyhow::Result<()> {
    let paths = Paths::new()?;
    println!("{}", serde_json::to_string_pretty(&collect(&paths)?)?);
    Ok(())
}

fn collect(paths: &Paths) -> anyhow::Result<serde_json::Value> {
    let config = super::load_config(paths)?;

    let records = if paths.memory_db().exists() {
        Some(super::open_memory(paths)?.len()?)
    } else {
        None
    };
    let runs = read_jsonl::<RunRecord>(&paths.runs_file())?.len();

    Ok(serde_json::json!({
        "data_dir": paths.data_dir.display().to_string(),
        "config_file": paths.config_file().exists(),
        "pipeline": config,
        "records": records,
        "runs": runs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_before_init() {
        let temp = tempfile::TempDir::new().unwrap();
        let status = collect(&Paths::at(temp.path())).unwrap();

        assert_eq!(status["config_file"], false);
        assert!(status["records"].is_null());
        assert_eq!(status["runs"], 0);
        assert_eq!(status["pipeline"]["recency_days"], 7);
    }

    #[test]
    fn test_status_counts_records() {
        let temp = tempfile::TempDir::new().unwrap();
        let paths = Paths::at(temp.path());
        super::super::open_memory(&paths).unwrap();

        let status = collect(&paths).unwrap();
        assert_eq!(status["records"], 0);
    }
}
