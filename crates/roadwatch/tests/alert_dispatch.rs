mod common;

use chrono::Duration;
use common::{Harness, COLOMBO};
use roadwatch_alerts::{AlertInput, AlertRegistry, AuthorityNotifier, VoiceNarrator};
use roadwatch_core::{Finding, LocationKey, Observation, Outcome};

fn registry() -> AlertRegistry {
    let mut registry = AlertRegistry::new();
    registry.register(Box::new(AuthorityNotifier::new()));
    registry.register(Box::new(VoiceNarrator::new()));
    registry
}

#[tokio::test]
async fn test_alerts_follow_pipeline_outcome() {
    let h = Harness::new("MEDIUM");
    h.classifier.set_hazards(vec![Finding::new("pothole", 0.91)]);
    let location = LocationKey::parse(COLOMBO, 4).unwrap();
    let mut alerts = registry();

    let reported = h.pipeline.run(Observation::new(location.clone(), "a.jpg")).await;
    let input = AlertInput::from_state(&reported, common::t0()).unwrap();
    let messages = alerts.dispatch(&input);
    assert_eq!(messages.len(), 2);
    assert!(messages[0].contains("Severity    : MEDIUM"));
    assert_eq!(messages[1], "VOICE ALERT: Warning. Road hazard detected ahead.");

    h.clock.advance(Duration::hours(1));
    let suppressed = h.pipeline.run(Observation::new(location, "b.jpg")).await;
    let input = AlertInput::from_state(&suppressed, common::t0()).unwrap();
    let messages = alerts.dispatch(&input);
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("duplicate notification skipped"));
}

#[tokio::test]
async fn test_low_priority_run_is_silent() {
    let h = Harness::new("LOW");
    let state = h
        .pipeline
        .run(Observation::new(LocationKey::parse(COLOMBO, 4).unwrap(), "a.jpg"))
        .await;

    let input = AlertInput::from_state(&state, common::t0()).unwrap();
    assert!(registry().dispatch(&input).is_empty());
}

#[tokio::test]
async fn test_repeat_sign_sighting_gets_advisory() {
    let h = Harness::new("LOW");
    h.classifier.set_signage(vec![Finding::new("school_zone", 0.8)]);
    let location = LocationKey::parse(COLOMBO, 4).unwrap();
    let mut alerts = registry();

    let reported = h.pipeline.run(Observation::new(location.clone(), "a.jpg")).await;
    assert_eq!(reported.outcome(), Some(Outcome::Reported));

    h.clock.advance(Duration::hours(1));
    let suppressed = h.pipeline.run(Observation::new(location, "b.jpg")).await;
    assert_eq!(suppressed.outcome(), Some(Outcome::Suppressed));

    let input = AlertInput::from_state(&suppressed, common::t0()).unwrap();
    let messages = alerts.dispatch(&input);
    assert_eq!(
        messages,
        vec!["ROAD SIGN ADVISORY: Warning. School zone ahead. Reduce speed and watch for children ahead."]
    );
}
