//! Detection Pipeline
//!
//! Runs three detectors per audit event:
//! 1. indicator match against the Indicator Store
//! 2. behavioral anomaly against per-entity baselines
//! 3. attack-pattern heuristics over the recent-event ring
//!
//! Detectors are read-only; benign learning happens in the engine only when
//! every detector stays silent.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Duration, Timelike, Utc};

use super::rules::{
    DetectionThresholds, ACCESS_FREQUENCY_WINDOW_MINUTES, BRUTE_FORCE_FAILURE_LIMIT,
    BRUTE_FORCE_SCAN_DEPTH, BRUTE_FORCE_WINDOW_MINUTES, EXFIL_DISTINCT_SECRET_LIMIT,
    EXFIL_SCAN_DEPTH, EXFIL_WINDOW_MINUTES,
};
use super::types::{Severity, ThreatCategory, ThreatSignal};
use crate::constants::RECENT_EVENT_CAPACITY;
use crate::logic::audit::AuditEvent;
use crate::logic::baseline::store::BaselineStore;
use crate::logic::baseline::types::EntityType;
use crate::logic::external_intel::store::IndicatorStore;
use crate::logic::external_intel::types::IndicatorKind;
use crate::logic::incident::log::EventLog;

// ============================================================================
// RECENT EVENT RING
// ============================================================================

/// Bounded ring of the raw audit events the engine has processed.
/// Pattern heuristics scan it; the event under inspection is included.
pub struct RecentEvents {
    events: VecDeque<(DateTime<Utc>, AuditEvent)>,
}

impl RecentEvents {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(RECENT_EVENT_CAPACITY),
        }
    }

    pub fn push(&mut self, ts: DateTime<Utc>, event: AuditEvent) {
        if self.events.len() >= RECENT_EVENT_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back((ts, event));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterate newest-first over at most `depth` entries
    fn scan(&self, depth: usize) -> impl Iterator<Item = &(DateTime<Utc>, AuditEvent)> {
        self.events.iter().rev().take(depth)
    }
}

impl Default for RecentEvents {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Run all detectors for one event. Returns zero-or-more signals.
pub fn run_detectors(
    event: &AuditEvent,
    ts: DateTime<Utc>,
    indicators: &IndicatorStore,
    baselines: &BaselineStore,
    log: &EventLog,
    recent: &RecentEvents,
    thresholds: &DetectionThresholds,
) -> Vec<ThreatSignal> {
    let mut signals = Vec::new();

    detect_indicator_match(event, indicators, &mut signals);
    detect_behavioral_anomaly(event, ts, baselines, log, thresholds, &mut signals);
    detect_attack_patterns(event, ts, recent, &mut signals);

    signals
}

// ============================================================================
// DETECTOR 1: INDICATOR MATCH
// ============================================================================

fn detect_indicator_match(
    event: &AuditEvent,
    indicators: &IndicatorStore,
    signals: &mut Vec<ThreatSignal>,
) {
    let Some(ip) = event.source_ip.as_deref() else {
        return;
    };

    if let Some(hit) = indicators.lookup(IndicatorKind::Ip, ip) {
        signals.push(ThreatSignal::new(
            hit.category,
            hit.severity,
            hit.confidence,
            format!("source IP {} matches indicator from '{}'", ip, hit.source),
        ));
    }
}

// ============================================================================
// DETECTOR 2: BEHAVIORAL ANOMALY
// ============================================================================

fn detect_behavioral_anomaly(
    event: &AuditEvent,
    ts: DateTime<Utc>,
    baselines: &BaselineStore,
    log: &EventLog,
    thresholds: &DetectionThresholds,
    signals: &mut Vec<ThreatSignal>,
) {
    let entities: [(EntityType, Option<&str>); 3] = [
        (EntityType::User, event.user_identity.as_deref()),
        (EntityType::Service, event.service_identity.as_deref()),
        (EntityType::Secret, event.secret_name.as_deref()),
    ];

    for (entity_type, entity_id) in entities {
        let Some(entity_id) = entity_id else { continue };
        let Some(baseline) = baselines.get(entity_type, entity_id) else {
            continue;
        };

        let hour = ts.hour();

        // Unusual time of access
        if !baseline.typical_hours.contains(&hour) {
            let fraction = baseline.hour_fraction_near(hour);
            if fraction < thresholds.unusual_time_threshold {
                signals.push(ThreatSignal::new(
                    ThreatCategory::AnomalousBehavior,
                    Severity::Medium,
                    1.0 - fraction,
                    format!(
                        "{} '{}' active at hour {} outside typical hours",
                        entity_type, entity_id, hour
                    ),
                ));
            }
        }

        // Source IP never seen for this entity
        if let Some(ip) = event.source_ip.as_deref() {
            if !baseline.typical_source_ips.is_empty()
                && !baseline.typical_source_ips.contains(ip)
            {
                signals.push(ThreatSignal::new(
                    ThreatCategory::AnomalousBehavior,
                    Severity::Medium,
                    thresholds.new_ip_threshold,
                    format!("{} '{}' seen from new IP {}", entity_type, entity_id, ip),
                ));
            }
        }

        // Secret never accessed by this entity before
        if let Some(secret) = event.secret_name.as_deref() {
            if !baseline.typical_secrets.is_empty() && !baseline.typical_secrets.contains(secret) {
                signals.push(ThreatSignal::new(
                    ThreatCategory::PrivilegeEscalation,
                    Severity::High,
                    thresholds.secret_anomaly_threshold,
                    format!(
                        "{} '{}' accessed unfamiliar secret '{}'",
                        entity_type, entity_id, secret
                    ),
                ));
            }
        }

        // Excessive access rate, secret baselines only
        if entity_type == EntityType::Secret && baseline.typical_frequency > 0.0 {
            let window = Duration::minutes(ACCESS_FREQUENCY_WINDOW_MINUTES);
            let recent_count = log.count_secret_incidents_within(entity_id, ts, window);
            let limit = baseline.typical_frequency * thresholds.access_frequency_multiplier;

            if recent_count as f64 > limit {
                signals.push(ThreatSignal::new(
                    ThreatCategory::Exfiltration,
                    Severity::High,
                    0.9,
                    format!(
                        "secret '{}' hit {} incidents in the last hour (typical {:.2}/h)",
                        entity_id, recent_count, baseline.typical_frequency
                    ),
                ));
            }
        }
    }
}

// ============================================================================
// DETECTOR 3: ATTACK-PATTERN HEURISTICS
// ============================================================================

fn detect_attack_patterns(
    event: &AuditEvent,
    ts: DateTime<Utc>,
    recent: &RecentEvents,
    signals: &mut Vec<ThreatSignal>,
) {
    let Some(identity) = event.identity() else {
        return;
    };

    // Brute force: repeated failures by the same identity
    if event.is_failure() {
        let cutoff = ts - Duration::minutes(BRUTE_FORCE_WINDOW_MINUTES);
        let failures = recent
            .scan(BRUTE_FORCE_SCAN_DEPTH)
            .filter(|(ets, e)| {
                *ets >= cutoff && e.is_failure() && e.identity() == Some(identity)
            })
            .count();

        if failures > BRUTE_FORCE_FAILURE_LIMIT {
            signals.push(ThreatSignal::new(
                ThreatCategory::BruteForce,
                Severity::High,
                0.9,
                format!(
                    "identity '{}' produced {} failures within the last hour",
                    identity, failures
                ),
            ));
        }
    }

    // Exfiltration burst: many distinct secrets read in a short window
    if event.is_successful_read() {
        let cutoff = ts - Duration::minutes(EXFIL_WINDOW_MINUTES);
        let mut secrets: HashSet<&str> = HashSet::new();

        for (ets, e) in recent.scan(EXFIL_SCAN_DEPTH) {
            if *ets < cutoff {
                continue;
            }
            if e.identity() != Some(identity) || !e.is_successful_read() {
                continue;
            }
            if let Some(secret) = e.secret_name.as_deref() {
                secrets.insert(secret);
            }
        }

        if secrets.len() > EXFIL_DISTINCT_SECRET_LIMIT {
            signals.push(ThreatSignal::new(
                ThreatCategory::Exfiltration,
                Severity::Critical,
                0.8,
                format!(
                    "identity '{}' read {} distinct secrets within {} minutes",
                    identity,
                    secrets.len(),
                    EXFIL_WINDOW_MINUTES
                ),
            ));
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::external_intel::types::IndicatorUpdate;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn base_event(timestamp: &str) -> AuditEvent {
        AuditEvent {
            timestamp: timestamp.to_string(),
            source_ip: Some("10.0.0.5".to_string()),
            user_identity: Some("alice".to_string()),
            secret_name: Some("db/creds".to_string()),
            operation: Some("read".to_string()),
            status: Some("success".to_string()),
            ..Default::default()
        }
    }

    fn empty_stores() -> (IndicatorStore, BaselineStore, EventLog, RecentEvents) {
        (
            IndicatorStore::new(),
            BaselineStore::new(),
            EventLog::new(100),
            RecentEvents::new(),
        )
    }

    #[test]
    fn test_clean_event_yields_no_signals() {
        let (indicators, baselines, log, recent) = empty_stores();
        let event = base_event("2026-03-01T09:00:00Z");

        let signals = run_detectors(
            &event,
            ts("2026-03-01T09:00:00Z"),
            &indicators,
            &baselines,
            &log,
            &recent,
            &DetectionThresholds::default(),
        );
        assert!(signals.is_empty());
    }

    #[test]
    fn test_indicator_match_fires_on_known_ip() {
        let (mut indicators, baselines, log, recent) = empty_stores();
        let mut update = IndicatorUpdate::new(IndicatorKind::Ip, "10.0.0.5");
        update.severity = Some(Severity::High);
        update.category = Some(ThreatCategory::Malware);
        indicators.upsert(vec![update]);

        let event = base_event("2026-03-01T09:00:00Z");
        let signals = run_detectors(
            &event,
            ts("2026-03-01T09:00:00Z"),
            &indicators,
            &baselines,
            &log,
            &recent,
            &DetectionThresholds::default(),
        );

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].category, ThreatCategory::Malware);
        assert_eq!(signals[0].severity, Severity::High);
    }

    #[test]
    fn test_new_ip_anomaly() {
        let (indicators, mut baselines, log, recent) = empty_stores();
        let learn = base_event("2026-03-01T09:00:00Z");
        baselines.record_benign_activity(&learn, ts("2026-03-01T09:00:00Z"));

        let mut event = base_event("2026-03-01T09:05:00Z");
        event.source_ip = Some("203.0.113.66".to_string());

        let signals = run_detectors(
            &event,
            ts("2026-03-01T09:05:00Z"),
            &indicators,
            &baselines,
            &log,
            &recent,
            &DetectionThresholds::default(),
        );

        // user baseline and secret baseline each flag the new IP
        assert!(!signals.is_empty());
        assert!(signals
            .iter()
            .all(|s| s.category == ThreatCategory::AnomalousBehavior));
        assert!(signals.iter().any(|s| s.details.contains("203.0.113.66")));
    }

    #[test]
    fn test_unfamiliar_secret_is_privilege_escalation() {
        let (indicators, mut baselines, log, recent) = empty_stores();
        let learn = base_event("2026-03-01T09:00:00Z");
        baselines.record_benign_activity(&learn, ts("2026-03-01T09:00:00Z"));

        let mut event = base_event("2026-03-01T09:05:00Z");
        event.secret_name = Some("prod/root-token".to_string());

        let signals = run_detectors(
            &event,
            ts("2026-03-01T09:05:00Z"),
            &indicators,
            &baselines,
            &log,
            &recent,
            &DetectionThresholds::default(),
        );

        assert!(signals
            .iter()
            .any(|s| s.category == ThreatCategory::PrivilegeEscalation
                && s.severity == Severity::High));
    }

    #[test]
    fn test_unusual_time_confidence_is_one_minus_fraction() {
        let (indicators, mut baselines, log, recent) = empty_stores();
        // Learn daytime hours only
        for i in 0..4 {
            let learn = base_event(&format!("2026-03-0{}T10:00:00Z", i + 1));
            baselines.record_benign_activity(&learn, ts(&format!("2026-03-0{}T10:00:00Z", i + 1)));
        }

        let event = base_event("2026-03-05T03:00:00Z");
        let signals = run_detectors(
            &event,
            ts("2026-03-05T03:00:00Z"),
            &indicators,
            &baselines,
            &log,
            &recent,
            &DetectionThresholds::default(),
        );

        let time_signals: Vec<_> = signals
            .iter()
            .filter(|s| s.details.contains("outside typical hours"))
            .collect();
        assert!(!time_signals.is_empty());
        // No recorded hour near 03:00 -> fraction 0 -> confidence 1.0
        assert!(time_signals.iter().all(|s| (s.confidence - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_zero_frequency_never_triggers_excessive_access() {
        let (indicators, mut baselines, mut log, recent) = empty_stores();
        let learn = base_event("2026-03-01T09:00:00Z");
        // Single benign sighting: typical_frequency stays 0.0
        baselines.record_benign_activity(&learn, ts("2026-03-01T09:00:00Z"));

        // Flood the log with incidents against the same secret
        for i in 0..50 {
            let event = base_event(&format!("2026-03-01T09:{:02}:00Z", i % 60));
            let parsed = event.validate().unwrap();
            log.push_incident(crate::logic::incident::consolidator::consolidate(
                &event,
                parsed,
                vec![ThreatSignal::new(
                    ThreatCategory::AnomalousBehavior,
                    Severity::Medium,
                    0.5,
                    "seed",
                )],
            ));
        }

        let event = base_event("2026-03-01T09:55:00Z");
        let signals = run_detectors(
            &event,
            ts("2026-03-01T09:55:00Z"),
            &indicators,
            &baselines,
            &log,
            &recent,
            &DetectionThresholds::default(),
        );

        assert!(!signals
            .iter()
            .any(|s| s.details.contains("incidents in the last hour")));
    }

    #[test]
    fn test_brute_force_fires_on_eleventh_failure() {
        let (indicators, baselines, log, mut recent) = empty_stores();
        let thresholds = DetectionThresholds::default();

        let mut fired_at = None;
        for i in 0..11 {
            let mut event = base_event(&format!("2026-03-01T09:{:02}:00Z", i));
            event.status = Some("failure".to_string());
            let parsed = event.validate().unwrap();
            recent.push(parsed, event.clone());

            let signals = run_detectors(
                &event, parsed, &indicators, &baselines, &log, &recent, &thresholds,
            );
            if signals
                .iter()
                .any(|s| s.category == ThreatCategory::BruteForce)
            {
                fired_at = Some(i + 1);
                break;
            }
        }

        assert_eq!(fired_at, Some(11));
    }

    #[test]
    fn test_exfil_burst_on_sixth_distinct_secret() {
        let (indicators, baselines, log, mut recent) = empty_stores();
        let thresholds = DetectionThresholds::default();

        let mut fired_at = None;
        for i in 0..6 {
            let mut event = base_event(&format!("2026-03-01T09:0{}:00Z", i));
            event.secret_name = Some(format!("secret-{}", i));
            let parsed = event.validate().unwrap();
            recent.push(parsed, event.clone());

            let signals = run_detectors(
                &event, parsed, &indicators, &baselines, &log, &recent, &thresholds,
            );
            if let Some(signal) = signals
                .iter()
                .find(|s| s.category == ThreatCategory::Exfiltration)
            {
                assert_eq!(signal.severity, Severity::Critical);
                fired_at = Some(i + 1);
                break;
            }
        }

        assert_eq!(fired_at, Some(6));
    }

    #[test]
    fn test_old_failures_outside_window_ignored() {
        let (indicators, baselines, log, mut recent) = empty_stores();

        // 11 failures, but spread over 11 hours
        for i in 0..11 {
            let mut event = base_event(&format!("2026-03-01T{:02}:00:00Z", i));
            event.status = Some("failure".to_string());
            let parsed = event.validate().unwrap();
            recent.push(parsed, event);
        }

        let mut event = base_event("2026-03-01T11:00:00Z");
        event.status = Some("failure".to_string());
        let signals = run_detectors(
            &event,
            ts("2026-03-01T11:00:00Z"),
            &indicators,
            &baselines,
            &log,
            &recent,
            &DetectionThresholds::default(),
        );

        assert!(!signals
            .iter()
            .any(|s| s.category == ThreatCategory::BruteForce));
    }
}
