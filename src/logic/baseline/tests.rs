use chrono::{DateTime, Duration, Utc};

use super::store::BaselineStore;
use super::types::{hour_distance, Baseline, EntityType};
use crate::logic::audit::AuditEvent;

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn benign_event() -> AuditEvent {
    AuditEvent {
        timestamp: "2026-03-01T09:15:00Z".to_string(),
        source_ip: Some("10.0.0.5".to_string()),
        user_identity: Some("alice".to_string()),
        secret_name: Some("db/creds".to_string()),
        operation: Some("read".to_string()),
        status: Some("success".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_first_sight_creates_baselines() {
    let mut store = BaselineStore::new();
    let event = benign_event();
    store.record_benign_activity(&event, ts("2026-03-01T09:15:00Z"));

    // user + secret entity (no service identity on the event)
    assert_eq!(store.len(), 2);

    let user = store.get(EntityType::User, "alice").unwrap();
    assert_eq!(user.typical_hours, vec![9]);
    assert_eq!(user.typical_source_ips.len(), 1);
    assert!(user.typical_source_ips.contains("10.0.0.5"));
    assert!(user.typical_secrets.contains("db/creds"));

    let secret = store.get(EntityType::Secret, "db/creds").unwrap();
    assert_eq!(secret.typical_frequency, 0.0); // first sight, no elapsed time
}

#[test]
fn test_frequency_ewma_for_secret_entity() {
    let mut store = BaselineStore::new();
    let event = benign_event();

    store.record_benign_activity(&event, ts("2026-03-01T09:00:00Z"));
    // Two hours later: 1/2 per hour, weighted 0.1
    store.record_benign_activity(&event, ts("2026-03-01T11:00:00Z"));

    let secret = store.get(EntityType::Secret, "db/creds").unwrap();
    assert!((secret.typical_frequency - 0.05).abs() < 1e-9);

    // Same-instant replay: EWMA must be skipped, not divided by zero
    store.record_benign_activity(&event, ts("2026-03-01T11:00:00Z"));
    let secret = store.get(EntityType::Secret, "db/creds").unwrap();
    assert!((secret.typical_frequency - 0.05).abs() < 1e-9);
}

#[test]
fn test_frequency_not_tracked_for_user_entity() {
    let mut store = BaselineStore::new();
    let event = benign_event();
    store.record_benign_activity(&event, ts("2026-03-01T09:00:00Z"));
    store.record_benign_activity(&event, ts("2026-03-01T11:00:00Z"));

    let user = store.get(EntityType::User, "alice").unwrap();
    assert_eq!(user.typical_frequency, 0.0);
}

#[test]
fn test_decay_removes_stale_profiles() {
    let mut store = BaselineStore::new();
    let event = benign_event();
    store.record_benign_activity(&event, Utc::now() - Duration::days(45));

    let mut fresh = benign_event();
    fresh.user_identity = Some("bob".to_string());
    fresh.secret_name = None;
    store.record_benign_activity(&fresh, Utc::now());

    let removed = store.decay(30);
    assert_eq!(removed, 2); // alice + db/creds
    assert!(store.get(EntityType::User, "bob").is_some());
    assert!(store.get(EntityType::User, "alice").is_none());
}

#[test]
fn test_hour_distance_wraps_midnight() {
    assert_eq!(hour_distance(23, 1), 2);
    assert_eq!(hour_distance(0, 12), 12);
    assert_eq!(hour_distance(5, 5), 0);
}

#[test]
fn test_hour_fraction_near() {
    let mut baseline = Baseline::new("alice", EntityType::User, Utc::now());
    for h in [9, 9, 10, 22] {
        baseline.push_hour(h);
    }

    // 9, 9, 10 are within +-2 of hour 9; 22 is not
    assert!((baseline.hour_fraction_near(9) - 0.75).abs() < 1e-9);
    assert_eq!(baseline.hour_fraction_near(3), 0.0);
}

#[test]
fn test_hour_history_is_bounded() {
    let mut baseline = Baseline::new("alice", EntityType::User, Utc::now());
    for _ in 0..(crate::constants::MAX_HOUR_SAMPLES + 50) {
        baseline.push_hour(9);
    }
    assert_eq!(baseline.typical_hours.len(), crate::constants::MAX_HOUR_SAMPLES);
}
