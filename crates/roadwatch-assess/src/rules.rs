use roadwatch_core::{AssessError, AssessmentContext, SeverityAssessor, Severity};

/// Local assessor used when no remote model is configured
#[derive(Debug, Clone)]
pub struct RuleAssessor {
    /// Any hazard at or above this confidence is HIGH
    pub high_confidence: f64,
    /// Any hazard whose box covers at least this many pixels is HIGH
    pub large_area_px: f64,
}

impl RuleAssessor {
    pub fn new() -> Self {
        Self {
            high_confidence: 0.8,
            large_area_px: 40_000.0,
        }
    }

    pub fn classify(&self, context: &AssessmentContext) -> Severity {
        let hazards = context
            .hazards
            .findings()
            .map(|set| set.findings.as_slice())
            .unwrap_or_default();

        if hazards.is_empty() {
            // Signage alone is informational
            return Severity::Low;
        }

        let severe = hazards.iter().any(|f| {
            f.confidence >= self.high_confidence
                || f.bounding_box
                    .is_some_and(|b| b.area() >= self.large_area_px)
        });
        if severe {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

impl Default for RuleAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SeverityAssessor for RuleAssessor {
    fn assess(&self, context: &AssessmentContext) -> Result<String, AssessError> {
        Ok(self.classify(context).as_str().to_string())
    }
}
