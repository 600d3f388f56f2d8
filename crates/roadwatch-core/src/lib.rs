//! Observation triage: detection, recency-gated prioritization and reporting

mod clock;
mod collaborators;
mod config;
mod error;
mod memory;
mod pipeline;
mod render;
mod state;
mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collaborators::{AssessmentContext, Classifier, FixedAssessor, SeverityAssessor};
pub use config::PipelineConfig;
pub use error::{AssessError, ClassifierError, ConfigError, InputError, StoreError};
pub use memory::{InMemoryMemory, LocationMemory};
pub use pipeline::{intake, DecisionPipeline};
pub use render::render_report;
pub use state::{Outcome, PipelineState, Stage, Step};
pub use types::{
    BoundingBox, Category, Detection, Finding, FindingSet, LocationKey, MemoryRecord,
    Observation, RecordMetadata, Severity,
};
