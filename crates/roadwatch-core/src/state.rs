//! Pipeline state and routing

use crate::types::{Detection, Observation, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Intake,
    Detection,
    Prioritization,
    Reporting,
}

/// Terminal outcome of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "ABORTED")]
    Aborted,
    #[serde(rename = "SUPPRESSED")]
    Suppressed,
    #[serde(rename = "LOW_PRIORITY")]
    LowPriority,
    #[serde(rename = "REPORTED")]
    Reported,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Aborted => "ABORTED",
            Outcome::Suppressed => "SUPPRESSED",
            Outcome::LowPriority => "LOW_PRIORITY",
            Outcome::Reported => "REPORTED",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the driver does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Run(Stage),
    Done(Outcome),
}

/// State threaded through the four stages.
///
/// Write sets: Intake owns `aborted`; Detection owns `hazard_findings` and
/// `signage_findings`; Prioritization owns `recently_reported`, `severity`
/// and `should_report`; Reporting owns `final_report` and `store_warning`.
/// Every stage appends to `audit_log` and advances `completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub observation: Observation,
    pub hazard_findings: Option<Detection>,
    pub signage_findings: Option<Detection>,
    pub recently_reported: Option<bool>,
    pub severity: Option<Severity>,
    pub should_report: bool,
    pub aborted: bool,
    pub audit_log: Vec<String>,
    pub final_report: Option<String>,
    /// Set when the report was produced but could not be persisted
    pub store_warning: Option<String>,
    pub completed: Option<Stage>,
}

impl PipelineState {
    pub fn new(observation: Observation) -> Self {
        Self {
            observation,
            hazard_findings: None,
            signage_findings: None,
            recently_reported: None,
            severity: None,
            should_report: false,
            aborted: false,
            audit_log: Vec::new(),
            final_report: None,
            store_warning: None,
            completed: None,
        }
    }

    pub fn log(&mut self, entry: impl Into<String>) {
        self.audit_log.push(entry.into());
    }

    /// Route from the fields already set; never re-runs a stage
    pub fn next_step(&self) -> Step {
        if self.aborted {
            return Step::Done(Outcome::Aborted);
        }
        match self.completed {
            None => Step::Run(Stage::Intake),
            Some(Stage::Intake) => Step::Run(Stage::Detection),
            Some(Stage::Detection) => Step::Run(Stage::Prioritization),
            Some(Stage::Prioritization) if self.should_report => Step::Run(Stage::Reporting),
            Some(Stage::Prioritization) if self.recently_reported == Some(true) => {
                Step::Done(Outcome::Suppressed)
            }
            Some(Stage::Prioritization) => Step::Done(Outcome::LowPriority),
            Some(Stage::Reporting) => Step::Done(Outcome::Reported),
        }
    }

    /// Terminal outcome, or None while stages remain
    pub fn outcome(&self) -> Option<Outcome> {
        match self.next_step() {
            Step::Done(outcome) => Some(outcome),
            Step::Run(_) => None,
        }
    }

    /// Rendered hazard summary, `Hazards: None` before Detection ran
    pub fn hazards_summary(&self) -> String {
        self.hazard_findings
            .as_ref()
            .map(Detection::render)
            .unwrap_or_else(|| "Hazards: None".to_string())
    }

    pub fn signs_summary(&self) -> String {
        self.signage_findings
            .as_ref()
            .map(Detection::render)
            .unwrap_or_else(|| "Signs: None".to_string())
    }

    /// True if either category detected something
    pub fn has_findings(&self) -> bool {
        [&self.hazard_findings, &self.signage_findings]
            .into_iter()
            .flatten()
            .any(Detection::has_findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Finding, FindingSet, LocationKey};

    fn state() -> PipelineState {
        let location = LocationKey::parse("6.9271,79.8612", 4).unwrap();
        PipelineState::new(Observation::new(location, "road.jpg"))
    }

    #[test]
    fn test_routing_walks_stages_in_order() {
        let mut s = state();
        assert_eq!(s.next_step(), Step::Run(Stage::Intake));
        s.completed = Some(Stage::Intake);
        assert_eq!(s.next_step(), Step::Run(Stage::Detection));
        s.completed = Some(Stage::Detection);
        assert_eq!(s.next_step(), Step::Run(Stage::Prioritization));
        s.completed = Some(Stage::Prioritization);
        s.should_report = true;
        assert_eq!(s.next_step(), Step::Run(Stage::Reporting));
        s.completed = Some(Stage::Reporting);
        assert_eq!(s.outcome(), Some(Outcome::Reported));
    }

    #[test]
    fn test_routing_terminal_branches() {
        let mut aborted = state();
        aborted.aborted = true;
        aborted.completed = Some(Stage::Intake);
        assert_eq!(aborted.outcome(), Some(Outcome::Aborted));

        let mut suppressed = state();
        suppressed.completed = Some(Stage::Prioritization);
        suppressed.recently_reported = Some(true);
        assert_eq!(suppressed.outcome(), Some(Outcome::Suppressed));

        let mut low = state();
        low.completed = Some(Stage::Prioritization);
        low.recently_reported = Some(false);
        assert_eq!(low.outcome(), Some(Outcome::LowPriority));
        assert_eq!(low.outcome().unwrap().to_string(), "LOW_PRIORITY");
    }

    #[test]
    fn test_has_findings_ignores_errors() {
        let mut s = state();
        assert!(!s.has_findings());
        s.hazard_findings = Some(Detection::TimedOut {
            category: Category::Hazard,
        });
        s.signage_findings = Some(Detection::Found(FindingSet::empty(Category::Signage)));
        assert!(!s.has_findings());
        s.signage_findings = Some(Detection::Found(FindingSet::new(
            Category::Signage,
            vec![Finding::new("school", 0.7)],
        )));
        assert!(s.has_findings());
        assert_eq!(s.hazards_summary(), "Hazards: Detection timed out");
    }
}
