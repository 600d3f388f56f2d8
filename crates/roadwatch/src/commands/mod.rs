pub mod analyze;
pub mod check;
pub mod history;
pub mod init;
pub mod recent;
pub mod runs;
pub mod status;
pub mod version;

use anyhow::Context;
use roadwatch_core::{MemoryRecord, PipelineConfig};
use roadwatch_store::SqliteMemory;
use roadwatch_telemetry::Paths;

pub(crate) fn load_config(paths: &Paths) -> anyhow::Result<PipelineConfig> {
    let path = paths.config_file();
    PipelineConfig::load(&path).with_context(|| format!("loading {}", path.display()))
}

pub(crate) fn open_memory(paths: &Paths) -> anyhow::Result<SqliteMemory> {
    let path = paths.memory_db();
    SqliteMemory::open(&path).with_context(|| format!("opening {}", path.display()))
}

/// One line per stored record
pub(crate) fn format_record(record: &MemoryRecord) -> String {
    format!(
        "  {} | {} | {:<6} | {}",
        record.timestamp.format("%Y-%m-%d %H:%M"),
        record.location,
        record
            .metadata
            .severity
            .map(|s| s.as_str())
            .unwrap_or("-"),
        record.summary_text
    )
}
