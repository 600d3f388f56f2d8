use crate::cli::AssessorKind;
use crate::sidecar::SidecarClassifier;
use anyhow::Context;
use chrono::Utc;
use roadwatch_alerts::{AlertInput, AlertRegistry, AuthorityNotifier, VoiceNarrator};
use roadwatch_assess::{RemoteAssessor, RuleAssessor, API_KEY_ENV};
use roadwatch_core::{
    DecisionPipeline, FixedAssessor, LocationKey, Observation, PipelineConfig, PipelineState,
    SeverityAssessor,
};
use roadwatch_telemetry::{append_jsonl, Paths, RunRecord};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

pub struct AnalyzeArgs {
    pub image: String,
    pub location: String,
    pub detections: Option<String>,
    pub assessor: AssessorKind,
    pub alerts: bool,
}

/// Terminal state of the run plus any alert messages it produced
pub struct Analysis {
    pub state: PipelineState,
    pub alerts: Vec<String>,
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let analysis = analyze(&paths, args)?;
    let state = &analysis.state;

    match &state.final_report {
        Some(report) => println!("{}", report),
        None => {
            for entry in &state.audit_log {
                println!("  • {}", entry);
            }
        }
    }
    if let Some(warning) = &state.store_warning {
        println!("\nWARNING: {}", warning);
    }
    for alert in &analysis.alerts {
        println!("\n{}", alert);
    }
    if let Some(outcome) = state.outcome() {
        println!("\nOutcome: {}", outcome);
    }
    Ok(())
}

pub fn analyze(paths: &Paths, args: AnalyzeArgs) -> anyhow::Result<Analysis> {
    paths.ensure_data_dir()?;
    let config = super::load_config(paths)?;
    let location = LocationKey::parse(&args.location, config.location_precision)?;

    let classifier = Arc::new(SidecarClassifier::new(args.detections.map(PathBuf::from)));
    let assessor = build_assessor(args.assessor, &config)?;
    let memory = Arc::new(super::open_memory(paths)?);
    let pipeline = DecisionPipeline::new(classifier, assessor, memory, config);

    let state = run_pipeline(&pipeline, Observation::new(location, args.image))?;
    let finished_at = Utc::now();

    let alerts = if args.alerts {
        dispatch_alerts(paths, &state, finished_at)
    } else {
        Vec::new()
    };

    let record = RunRecord {
        run_id: format!("run_{}", finished_at.format("%Y%m%dT%H%M%S%.6fZ")),
        timestamp: finished_at,
        location: state.observation.location.to_string(),
        image: state.observation.image_reference.clone(),
        outcome: state
            .outcome()
            .map(|o| o.as_str().to_string())
            .unwrap_or_default(),
        severity: state.severity.map(|s| s.as_str().to_string()),
        audit_log: state.audit_log.clone(),
        store_warning: state.store_warning.clone(),
    };
    if let Err(e) = append_jsonl(&paths.runs_file(), &record) {
        warn!(error = %e, "failed to append run log");
    }

    Ok(Analysis { state, alerts })
}

/// Drive one run to completion without waiting on collaborator calls that
/// outlived their timeout.
fn run_pipeline(
    pipeline: &DecisionPipeline,
    observation: Observation,
) -> anyhow::Result<PipelineState> {
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let state = runtime.block_on(pipeline.run(observation));
    // Dropping the runtime would join abandoned spawn_blocking tasks
    runtime.shutdown_background();
    Ok(state)
}

fn build_assessor(
    kind: AssessorKind,
    config: &PipelineConfig,
) -> anyhow::Result<Arc<dyn SeverityAssessor>> {
    Ok(match kind {
        AssessorKind::Rules => Arc::new(RuleAssessor::default()),
        AssessorKind::Fixed => Arc::new(FixedAssessor(config.default_severity)),
        AssessorKind::Remote => {
            let remote = RemoteAssessor::from_env()
                .ok_or_else(|| anyhow::anyhow!("{} is not set", API_KEY_ENV))??;
            Arc::new(remote)
        }
    })
}

fn dispatch_alerts(
    paths: &Paths,
    state: &PipelineState,
    finished_at: chrono::DateTime<Utc>,
) -> Vec<String> {
    let Some(input) = AlertInput::from_state(state, finished_at) else {
        return Vec::new();
    };

    let mut registry = AlertRegistry::with_config(paths.config_file());
    registry.register(Box::new(
        AuthorityNotifier::new().with_outbox(paths.outbox_dir()),
    ));
    registry.register(Box::new(VoiceNarrator::new()));
    registry.dispatch(&input)
}
