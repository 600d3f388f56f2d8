use criterion::{criterion_group, criterion_main, Criterion};
use roadwatch_core::{
    Category, Classifier, ClassifierError, DecisionPipeline,
    Finding, FindingSet, FixedAssessor, InMemoryMemory, LocationKey, LocationMemory, Observation,
    PipelineConfig, Severity,
};
use roadwatch_store::SqliteMemory;
use std::hint::black_box;
use std::sync::Arc;

struct OnePothole;

impl Classifier for OnePothole {
    fn detect(&self, _image: &str, category: Category) -> Result<FindingSet, ClassifierError> {
        Ok(match category {
            Category::Hazard => FindingSet::new(category, vec![Finding::new("pothole", 0.91)]),
            Category::Signage => FindingSet::empty(category),
        })
    }
}

fn pipeline(memory: Arc<dyn LocationMemory>) -> DecisionPipeline {
    DecisionPipeline::new(
        Arc::new(OnePothole),
        Arc::new(FixedAssessor(Severity::High)),
        memory,
        PipelineConfig::default(),
    )
}

fn bench_suppressed_run(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let pipeline = pipeline(Arc::new(InMemoryMemory::new()));
    let location = LocationKey::parse("6.9271,79.8612", 4).unwrap();
    runtime.block_on(pipeline.run(Observation::new(location.clone(), "a.jpg")));

    c.bench_function("pipeline_suppressed_run", |b| {
        b.iter(|| {
            let state = runtime.block_on(
                pipeline.run(Observation::new(black_box(location.clone()), "a.jpg")),
            );
            black_box(state);
        });
    });
}

fn bench_reported_run_sqlite(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let dir = tempfile::TempDir::new().unwrap();
    let memory = Arc::new(SqliteMemory::open(&dir.path().join("memory.db")).unwrap());
    let pipeline = pipeline(memory);
    let mut n: u64 = 0;

    c.bench_function("pipeline_reported_run_sqlite", |b| {
        b.iter(|| {
            // Fresh key each time so nothing is suppressed
            n += 1;
            let location = LocationKey::parse(&format!("site-{}", n), 4).unwrap();
            let state = runtime.block_on(pipeline.run(Observation::new(location, "a.jpg")));
            black_box(state);
        });
    });
}

fn bench_recency_lookup(c: &mut Criterion) {
    let dir = tempfile::TempDir::new().unwrap();
    let memory = SqliteMemory::open(&dir.path().join("memory.db")).unwrap();
    let now = chrono::Utc::now();
    for i in 0..1000 {
        let location = LocationKey::parse(&format!("site-{}", i % 100), 4).unwrap();
        let record = roadwatch_core::MemoryRecord::new(
            location,
            now - chrono::Duration::minutes(i),
            "a.jpg",
            "Hazards: pothole".to_string(),
            "Signs: None".to_string(),
            None,
        );
        memory.append(&record).unwrap();
    }
    let location = LocationKey::parse("site-42", 4).unwrap();

    c.bench_function("recency_lookup_1000_records", |b| {
        b.iter(|| {
            black_box(memory.was_reported_within(
                black_box(&location),
                chrono::Duration::days(7),
                now,
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_suppressed_run,
    bench_reported_run_sqlite,
    bench_recency_lookup
);
criterion_main!(benches);
