//! Run log record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of runs.jsonl, written by the CLI after every pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub image: String,
    /// Terminal outcome tag (ABORTED, SUPPRESSED, LOW_PRIORITY, REPORTED)
    pub outcome: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub audit_log: Vec<String>,
    #[serde(default)]
    pub store_warning: Option<String>,
}
