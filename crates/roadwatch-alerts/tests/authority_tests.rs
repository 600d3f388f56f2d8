use chrono::{TimeZone, Utc};
use roadwatch_alerts::{authority_email, AlertChannel, AlertInput, AuthorityNotifier, AuthorityReport};
use roadwatch_core::{Category, Detection, Finding, FindingSet, LocationKey, Outcome, Severity};
use std::path::Path;

fn reported(image: &Path, hazards: Vec<Finding>, signs: Vec<Finding>) -> AlertInput {
    AlertInput {
        outcome: Outcome::Reported,
        location: LocationKey::parse("6.9271,79.8612", 4).unwrap(),
        image_reference: image.display().to_string(),
        hazards: Detection::Found(FindingSet::new(Category::Hazard, hazards)),
        signage: Detection::Found(FindingSet::new(Category::Signage, signs)),
        severity: Some(Severity::Medium),
        generated_at: Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
    }
}

#[test]
fn test_report_fields() {
    let temp = tempfile::TempDir::new().unwrap();
    let image = temp.path().join("road.jpg");
    std::fs::write(&image, [0xff, 0xd8, 0xff]).unwrap();

    let report = AuthorityReport::build(&reported(&image, vec![Finding::new("pothole", 0.91)], vec![]));

    assert_eq!(report.location, "6.9271,79.8612");
    assert_eq!(report.location_link, "https://maps.google.com/?q=6.9271,79.8612");
    assert_eq!(report.severity, Severity::Medium);
    assert_eq!(report.findings, "Hazards: pothole (conf 0.91) | Signs: None");
    assert_eq!(report.photo_base64.as_deref(), Some("/9j/"));

    let message = report.message();
    assert!(message.starts_with("NEW ROAD HAZARD REPORTED"));
    assert!(message.contains("Severity    : MEDIUM"));
    assert!(message.contains("Timestamp   : 2025-03-01T08:00:00Z"));
}

#[test]
fn test_email_mentions_missing_photo() {
    let report = AuthorityReport::build(&reported(
        Path::new("/nonexistent/road.jpg"),
        vec![Finding::new("crack", 0.6)],
        vec![],
    ));
    assert!(report.photo_base64.is_none());

    let email = authority_email(&report);
    assert!(email.starts_with("Subject: Road hazard detected (MEDIUM severity) at 6.9271,79.8612"));
    assert!(email.contains("Map: https://maps.google.com/?q=6.9271,79.8612"));
    assert!(email.contains("No photo could be attached"));
}

#[test]
fn test_notifier_skips_signage_only_reports() {
    let mut notifier = AuthorityNotifier::new();
    let input = reported(
        Path::new("road.jpg"),
        vec![],
        vec![Finding::new("school_zone", 0.8)],
    );

    assert!(notifier.on_reported(&input).is_none());
    assert!(notifier.sent().is_empty());
}

#[test]
fn test_notifier_writes_outbox() {
    let temp = tempfile::TempDir::new().unwrap();
    let outbox = temp.path().join("outbox");
    let mut notifier = AuthorityNotifier::new().with_outbox(&outbox);

    let input = reported(Path::new("road.jpg"), vec![Finding::new("pothole", 0.91)], vec![]);
    let message = notifier.on_reported(&input).unwrap();
    assert!(message.contains("Saved"));
    assert_eq!(notifier.sent().len(), 1);

    let files: Vec<_> = std::fs::read_dir(&outbox).unwrap().flatten().collect();
    assert_eq!(files.len(), 1);
    let saved: AuthorityReport =
        serde_json::from_str(&std::fs::read_to_string(files[0].path()).unwrap()).unwrap();
    assert_eq!(saved, notifier.sent()[0]);
}
