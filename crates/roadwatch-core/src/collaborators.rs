//! Seams for the external detector and severity assessor

use crate::error::{AssessError, ClassifierError};
use crate::types::{Category, Detection, FindingSet, LocationKey, Severity};

/// Opaque object detector. Must be side-effect-free.
pub trait Classifier: Send + Sync {
    fn detect(&self, image_reference: &str, category: Category)
        -> Result<FindingSet, ClassifierError>;
}

/// What the assessor sees about a run
#[derive(Debug, Clone)]
pub struct AssessmentContext {
    pub location: LocationKey,
    /// Rendered summary of both categories
    pub findings_summary: String,
    pub hazards: Detection,
    pub signage: Detection,
}

/// Opaque severity classifier. Returns a tier label; anything that is not
/// LOW/MEDIUM/HIGH is coerced to HIGH by the caller.
pub trait SeverityAssessor: Send + Sync {
    fn assess(&self, context: &AssessmentContext) -> Result<String, AssessError>;
}

/// Assessor that always answers with one tier
#[derive(Debug, Clone, Copy)]
pub struct FixedAssessor(pub Severity);

impl SeverityAssessor for FixedAssessor {
    fn assess(&self, _context: &AssessmentContext) -> Result<String, AssessError> {
        Ok(self.0.as_str().to_string())
    }
}
