//! Four-stage decision pipeline: Intake → Detection → Prioritization → Reporting

use crate::clock::{Clock, SystemClock};
use crate::collaborators::{AssessmentContext, Classifier, SeverityAssessor};
use crate::config::PipelineConfig;
use crate::error::{InputError, StoreError};
use crate::memory::LocationMemory;
use crate::render::render_report;
use crate::state::{PipelineState, Stage, Step};
use crate::types::{Category, Detection, MemoryRecord, Observation, Severity};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives one observation at a time through the stages. Collaborators are
/// injected so the same pipeline can be shared by concurrent runs.
pub struct DecisionPipeline {
    classifier: Arc<dyn Classifier>,
    assessor: Arc<dyn SeverityAssessor>,
    memory: Arc<dyn LocationMemory>,
    clock: Arc<dyn Clock>,
    config: PipelineConfig,
}

impl DecisionPipeline {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        assessor: Arc<dyn SeverityAssessor>,
        memory: Arc<dyn LocationMemory>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            classifier,
            assessor,
            memory,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn memory(&self) -> &Arc<dyn LocationMemory> {
        &self.memory
    }

    /// Run every stage the routing asks for and return the terminal state
    pub async fn run(&self, observation: Observation) -> PipelineState {
        let mut state = PipelineState::new(observation);
        loop {
            state = match state.next_step() {
                Step::Run(Stage::Intake) => intake(state),
                Step::Run(Stage::Detection) => self.detect(state).await,
                Step::Run(Stage::Prioritization) => self.prioritize(state).await,
                Step::Run(Stage::Reporting) => self.report(state).await,
                Step::Done(outcome) => {
                    info!(
                        location = %state.observation.location,
                        outcome = %outcome,
                        "pipeline run finished"
                    );
                    return state;
                }
            };
        }
    }

    /// Classify hazards and signage concurrently. Classifier failures are
    /// recorded as tagged results and never abort the run.
    pub async fn detect(&self, mut state: PipelineState) -> PipelineState {
        let image = state.observation.image_reference.clone();
        let (hazards, signage) = tokio::join!(
            self.classify(image.clone(), Category::Hazard),
            self.classify(image, Category::Signage),
        );

        state.log(format!("Detection → {}", hazards.render()));
        state.log(format!("Detection → {}", signage.render()));
        state.hazard_findings = Some(hazards);
        state.signage_findings = Some(signage);
        state.completed = Some(Stage::Detection);
        state
    }

    async fn classify(&self, image: String, category: Category) -> Detection {
        let classifier = Arc::clone(&self.classifier);
        let call = tokio::task::spawn_blocking(move || classifier.detect(&image, category));

        match tokio::time::timeout(self.config.classifier_timeout(), call).await {
            Ok(Ok(Ok(mut set))) => {
                let detected = set.findings.len();
                set.category = category;
                // Detector output is not trusted to stay within [0, 1]
                for finding in &mut set.findings {
                    finding.confidence = finding.confidence.clamp(0.0, 1.0);
                }
                set.findings
                    .retain(|f| f.confidence >= self.config.min_confidence);
                debug!(
                    ?category,
                    detected,
                    kept = set.findings.len(),
                    "classifier returned"
                );
                Detection::Found(set)
            }
            Ok(Ok(Err(e))) => {
                warn!(?category, error = %e, "classifier could not read image");
                Detection::ReadError {
                    category,
                    reason: e.to_string(),
                }
            }
            Ok(Err(join_error)) => {
                warn!(?category, error = %join_error, "classifier task failed");
                Detection::ReadError {
                    category,
                    reason: join_error.to_string(),
                }
            }
            Err(_) => {
                warn!(
                    ?category,
                    timeout_ms = self.config.classifier_timeout_ms,
                    "classifier timed out"
                );
                Detection::TimedOut { category }
            }
        }
    }

    /// Decide between suppression, low priority and reporting
    pub async fn prioritize(&self, mut state: PipelineState) -> PipelineState {
        state.completed = Some(Stage::Prioritization);
        let location = state.observation.location.clone();
        let cutoff = self.clock.now() - self.config.recency_window();

        let key = location.clone();
        let lookup = self
            .store_call(move |memory| memory.last_reported_after(&key, cutoff))
            .await;
        let last_report = match lookup {
            Ok(last) => last,
            Err(e) => {
                warn!(location = %location, error = %e, "recency check failed, treating as not reported");
                state.log(format!(
                    "Prioritization → recency check failed ({}), treating location as not reported",
                    e
                ));
                None
            }
        };

        if let Some(at) = last_report {
            state.recently_reported = Some(true);
            state.should_report = false;
            state.log(format!(
                "Prioritization → location {} already reported at {} (within {} days) → suppressed",
                location,
                at.format("%Y-%m-%d %H:%M:%S"),
                self.config.recency_days
            ));
            return state;
        }
        state.recently_reported = Some(false);

        if !state.has_findings() {
            state.should_report = false;
            state.log("Prioritization → no significant findings → low priority");
            return state;
        }

        let severity = self.assess(&mut state).await;
        state.severity = Some(severity);
        state.should_report = true;
        state.log(format!(
            "Prioritization → new {} severity finding → proceed to report",
            severity
        ));
        state
    }

    async fn assess(&self, state: &mut PipelineState) -> Severity {
        let context = AssessmentContext {
            location: state.observation.location.clone(),
            findings_summary: format!("{} | {}", state.hazards_summary(), state.signs_summary()),
            hazards: state
                .hazard_findings
                .clone()
                .unwrap_or(Detection::TimedOut {
                    category: Category::Hazard,
                }),
            signage: state
                .signage_findings
                .clone()
                .unwrap_or(Detection::TimedOut {
                    category: Category::Signage,
                }),
        };
        let assessor = Arc::clone(&self.assessor);
        let call = tokio::task::spawn_blocking(move || assessor.assess(&context));

        let failure = match tokio::time::timeout(self.config.assessor_timeout(), call).await {
            Ok(Ok(Ok(label))) => match Severity::from_label(&label) {
                Some(severity) => return severity,
                None => format!("unrecognised tier {:?}", label.trim()),
            },
            Ok(Ok(Err(e))) => e.to_string(),
            Ok(Err(join_error)) => join_error.to_string(),
            Err(_) => format!("timed out after {}ms", self.config.assessor_timeout_ms),
        };

        warn!(location = %state.observation.location, reason = %failure, "severity assessment unavailable, defaulting to HIGH");
        state.log(format!(
            "Prioritization → severity assessment unavailable ({}), defaulting to HIGH",
            failure
        ));
        Severity::High
    }

    /// Run a store operation off the async workers; SQLite may block on
    /// its busy timeout.
    async fn store_call<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn LocationMemory) -> Result<T, StoreError> + Send + 'static,
    {
        let memory = Arc::clone(&self.memory);
        tokio::task::spawn_blocking(move || call(memory.as_ref()))
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
    }

    /// Render the report and persist a record. A failed append is recorded
    /// as a warning; the report is still returned.
    pub async fn report(&self, mut state: PipelineState) -> PipelineState {
        let now = self.clock.now();
        let report = render_report(&state, now);
        let record = MemoryRecord::new(
            state.observation.location.clone(),
            now,
            state.observation.image_reference.clone(),
            state.hazards_summary(),
            state.signs_summary(),
            state.severity,
        );

        let stored = record.clone();
        match self.store_call(move |memory| memory.append(&stored)).await {
            Ok(()) => {
                info!(record_id = %record.record_id, "report saved");
                state.log(format!("Reporting → report saved as {}", record.record_id));
            }
            Err(e) => {
                warn!(record_id = %record.record_id, error = %e, "report could not be saved");
                state.store_warning = Some(e.to_string());
                state.log(format!("Reporting → report generated but not saved: {}", e));
            }
        }

        state.final_report = Some(report);
        state.completed = Some(Stage::Reporting);
        state
    }
}

/// Validate the observation; no I/O beyond field checks
pub fn intake(mut state: PipelineState) -> PipelineState {
    if state.observation.has_image() {
        state.log(format!(
            "Intake → validated observation at {} (image {})",
            state.observation.location, state.observation.image_reference
        ));
    } else {
        state.aborted = true;
        state.log(format!("Intake → ERROR: {}, run aborted", InputError::MissingImage));
    }
    state.completed = Some(Stage::Intake);
    state
}
