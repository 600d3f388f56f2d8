#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use roadwatch_core::{
    AssessError, AssessmentContext, Category, Classifier, ClassifierError, DecisionPipeline,
    Finding, FindingSet, ManualClock, PipelineConfig, SeverityAssessor,
};
use roadwatch_store::SqliteMemory;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const COLOMBO: &str = "6.9271,79.8612";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
}

/// Classifier returning whatever the test last set, counting calls
#[derive(Default)]
pub struct ScriptedClassifier {
    hazards: Mutex<Vec<Finding>>,
    signage: Mutex<Vec<Finding>>,
    pub calls: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn set_hazards(&self, findings: Vec<Finding>) {
        *self.hazards.lock().unwrap() = findings;
    }

    pub fn set_signage(&self, findings: Vec<Finding>) {
        *self.signage.lock().unwrap() = findings;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for ScriptedClassifier {
    fn detect(
        &self,
        _image_reference: &str,
        category: Category,
    ) -> Result<FindingSet, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let findings = match category {
            Category::Hazard => self.hazards.lock().unwrap().clone(),
            Category::Signage => self.signage.lock().unwrap().clone(),
        };
        Ok(FindingSet::new(category, findings))
    }
}

/// Assessor answering a fixed label, counting calls
pub struct CountingAssessor {
    label: String,
    pub calls: AtomicUsize,
}

impl CountingAssessor {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SeverityAssessor for CountingAssessor {
    fn assess(&self, _context: &AssessmentContext) -> Result<String, AssessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.label.clone())
    }
}

/// Pipeline wired to a SQLite store in a temp directory and a manual clock
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub classifier: Arc<ScriptedClassifier>,
    pub assessor: Arc<CountingAssessor>,
    pub memory: Arc<SqliteMemory>,
    pub clock: Arc<ManualClock>,
    pub pipeline: DecisionPipeline,
}

impl Harness {
    pub fn new(assessor_label: &str) -> Self {
        let dir = tempfile::TempDir::new().unwrap();
        let classifier = Arc::new(ScriptedClassifier::default());
        let assessor = Arc::new(CountingAssessor::new(assessor_label));
        let memory = Arc::new(SqliteMemory::open(&dir.path().join("memory.db")).unwrap());
        let clock = Arc::new(ManualClock::new(t0()));

        let pipeline = DecisionPipeline::new(
            classifier.clone(),
            assessor.clone(),
            memory.clone(),
            PipelineConfig::default(),
        )
        .with_clock(clock.clone());

        Self {
            dir,
            classifier,
            assessor,
            memory,
            clock,
            pipeline,
        }
    }
}
