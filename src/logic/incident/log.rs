//! Bounded Event Log
//!
//! Fixed-capacity history of consolidated incidents and response records.
//! Inserting beyond capacity evicts the oldest entry (FIFO).

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

use super::types::{Incident, IncidentFilter};
use crate::logic::response::types::ResponseRecord;

pub struct EventLog {
    incidents: VecDeque<Incident>,
    responses: VecDeque<ResponseRecord>,
    capacity: usize,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            incidents: VecDeque::with_capacity(capacity.min(1024)),
            responses: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }

    pub fn push_incident(&mut self, incident: Incident) {
        if self.incidents.len() >= self.capacity {
            self.incidents.pop_front();
        }
        self.incidents.push_back(incident);
    }

    pub fn push_response(&mut self, record: ResponseRecord) {
        if self.responses.len() >= self.capacity {
            self.responses.pop_front();
        }
        self.responses.push_back(record);
    }

    /// Query incidents newest-first, capped at the filter limit
    pub fn query(&self, filter: &IncidentFilter) -> Vec<Incident> {
        self.incidents
            .iter()
            .rev()
            .filter(|inc| filter.matches(inc))
            .take(filter.limit)
            .cloned()
            .collect()
    }

    /// Latest response records, newest-first
    pub fn recent_responses(&self, limit: usize) -> Vec<ResponseRecord> {
        self.responses.iter().rev().take(limit).cloned().collect()
    }

    /// Mark an incident resolved. Returns false when the id is unknown
    /// (possibly already evicted).
    pub fn resolve(&mut self, incident_id: &str) -> bool {
        for incident in self.incidents.iter_mut().rev() {
            if incident.id == incident_id {
                incident.resolved = true;
                return true;
            }
        }
        false
    }

    /// Incidents referencing `secret_name` with timestamps inside the
    /// trailing window ending at `now`.
    ///
    /// Append order is not timestamp order (event timestamps only have to
    /// be valid, not monotonic), so the whole bounded deque is scanned.
    pub fn count_secret_incidents_within(
        &self,
        secret_name: &str,
        now: DateTime<Utc>,
        window: Duration,
    ) -> usize {
        let cutoff = now - window;
        self.incidents
            .iter()
            .filter(|inc| inc.timestamp >= cutoff)
            .filter(|inc| inc.secret_name.as_deref() == Some(secret_name))
            .count()
    }

    /// Incident counts per identity inside the trailing window (used by the
    /// threat hunter)
    pub fn incidents_by_identity_within(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> HashMap<String, usize> {
        let cutoff = now - window;
        let mut counts: HashMap<String, usize> = HashMap::new();

        for incident in self.incidents.iter() {
            if incident.timestamp < cutoff {
                continue;
            }
            if let Some(identity) = incident.identity() {
                *counts.entry(identity.to_string()).or_insert(0) += 1;
            }
        }

        counts
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::audit::AuditEvent;
    use crate::logic::incident::consolidator::consolidate;
    use crate::logic::response::types::ResponseAction;
    use crate::logic::threat::types::{Severity, ThreatCategory, ThreatSignal};

    fn incident_at(ts: &str, user: &str, secret: Option<&str>) -> Incident {
        let event = AuditEvent {
            timestamp: ts.to_string(),
            user_identity: Some(user.to_string()),
            secret_name: secret.map(|s| s.to_string()),
            ..Default::default()
        };
        let parsed = event.validate().unwrap();
        consolidate(
            &event,
            parsed,
            vec![ThreatSignal::new(
                ThreatCategory::AnomalousBehavior,
                Severity::Medium,
                0.5,
                "test",
            )],
        )
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let mut log = EventLog::new(3);
        for i in 0..5 {
            log.push_incident(incident_at(
                &format!("2026-03-01T12:00:0{}Z", i),
                &format!("u{}", i),
                None,
            ));
        }

        assert_eq!(log.incident_count(), 3);
        let all = log.query(&IncidentFilter::default());
        // Newest-first; u0 and u1 were evicted
        assert_eq!(all[0].user_identity.as_deref(), Some("u4"));
        assert_eq!(all[2].user_identity.as_deref(), Some("u2"));
    }

    #[test]
    fn test_query_newest_first_with_limit() {
        let mut log = EventLog::new(100);
        for i in 0..10 {
            log.push_incident(incident_at(
                &format!("2026-03-01T12:00:{:02}Z", i),
                "alice",
                None,
            ));
        }

        let filter = IncidentFilter {
            limit: 4,
            ..Default::default()
        };
        let results = log.query(&filter);
        assert_eq!(results.len(), 4);
        assert!(results[0].timestamp > results[3].timestamp);
    }

    #[test]
    fn test_query_filters_severity_and_resolved() {
        let mut log = EventLog::new(100);
        let mut resolved = incident_at("2026-03-01T12:00:00Z", "alice", None);
        resolved.resolved = true;
        log.push_incident(resolved);
        log.push_incident(incident_at("2026-03-01T12:00:01Z", "bob", None));

        let filter = IncidentFilter {
            resolved: Some(false),
            ..Default::default()
        };
        let open = log.query(&filter);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].user_identity.as_deref(), Some("bob"));

        let filter = IncidentFilter {
            severity: Some(Severity::Critical),
            ..Default::default()
        };
        assert!(log.query(&filter).is_empty());
    }

    #[test]
    fn test_resolve_by_id() {
        let mut log = EventLog::new(100);
        let incident = incident_at("2026-03-01T12:00:00Z", "alice", None);
        let id = incident.id.clone();
        log.push_incident(incident);

        assert!(log.resolve(&id));
        assert!(!log.resolve("inc-missing"));

        let filter = IncidentFilter {
            resolved: Some(true),
            ..Default::default()
        };
        assert_eq!(log.query(&filter).len(), 1);
    }

    #[test]
    fn test_count_secret_incidents_within_window() {
        let mut log = EventLog::new(100);
        log.push_incident(incident_at("2026-03-01T10:00:00Z", "alice", Some("db/creds")));
        log.push_incident(incident_at("2026-03-01T11:40:00Z", "alice", Some("db/creds")));
        log.push_incident(incident_at("2026-03-01T11:50:00Z", "bob", Some("other")));

        let now = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let count = log.count_secret_incidents_within("db/creds", now, Duration::hours(1));
        assert_eq!(count, 1); // the 10:00 incident is outside the hour
    }

    #[test]
    fn test_window_counts_survive_out_of_order_appends() {
        let mut log = EventLog::new(100);
        log.push_incident(incident_at("2026-03-01T11:40:00Z", "alice", Some("db/creds")));
        log.push_incident(incident_at("2026-03-01T11:50:00Z", "alice", Some("db/creds")));
        // Older timestamp appended last must not mask the in-window entries
        log.push_incident(incident_at("2026-03-01T09:00:00Z", "alice", Some("db/creds")));

        let now = DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let count = log.count_secret_incidents_within("db/creds", now, Duration::hours(1));
        assert_eq!(count, 2);

        let counts = log.incidents_by_identity_within(now, Duration::hours(1));
        assert_eq!(counts.get("alice"), Some(&2));
    }

    #[test]
    fn test_responses_are_bounded() {
        let mut log = EventLog::new(2);
        for i in 0..4 {
            log.push_response(ResponseRecord::new(
                &format!("inc-{}", i),
                ResponseAction::AlertOnly,
                true,
            ));
        }
        assert_eq!(log.recent_responses(10).len(), 2);
        assert_eq!(log.recent_responses(10)[0].incident_id, "inc-3");
    }
}
