//! Error taxonomy for pipeline runs and their collaborators

use thiserror::Error;

/// Invalid observation; the only error that ends a run without a report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("no image provided")]
    MissingImage,

    #[error("invalid location key: {0:?}")]
    InvalidLocation(String),
}

/// Classifier failure, recovered by Detection as a non-fatal result
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("image could not be read: {0}")]
    Unreadable(String),

    #[error("detector failed: {0}")]
    Model(String),
}

/// Severity assessor failure, recovered by Prioritization as HIGH
#[derive(Debug, Error)]
pub enum AssessError {
    #[error("assessor unavailable: {0}")]
    Unavailable(String),

    #[error("assessor request failed: {0}")]
    Http(String),

    #[error("assessor returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Persistence failure in a LocationMemory
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("corrupt record {record_id}: {reason}")]
    Corrupt { record_id: String, reason: String },

    #[error("record id already exists: {0}")]
    DuplicateId(String),
}

/// Configuration file could not be loaded
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
}
