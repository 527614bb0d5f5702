//! Baseline Store
//!
//! Create-on-first-sight profiles keyed by `entity_type:entity_id`.
//! The decay pass is only ever invoked by the baseline maintenance worker.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Timelike, Utc};

use super::types::{Baseline, EntityType};
use crate::logic::audit::AuditEvent;

pub struct BaselineStore {
    baselines: HashMap<String, Baseline>,
}

impl BaselineStore {
    pub fn new() -> Self {
        Self {
            baselines: HashMap::new(),
        }
    }

    fn key(entity_type: EntityType, entity_id: &str) -> String {
        format!("{}:{}", entity_type.as_str(), entity_id)
    }

    pub fn get(&self, entity_type: EntityType, entity_id: &str) -> Option<&Baseline> {
        self.baselines.get(&Self::key(entity_type, entity_id))
    }

    pub fn len(&self) -> usize {
        self.baselines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty()
    }

    /// Learn from an event that produced no detector signals.
    ///
    /// Each entity present on the event (user, service, secret) gets its
    /// profile created or updated. Secret baselines also maintain the
    /// access-frequency EWMA.
    pub fn record_benign_activity(&mut self, event: &AuditEvent, ts: DateTime<Utc>) {
        let mut entities: Vec<(EntityType, &str)> = Vec::new();
        if let Some(user) = event.user_identity.as_deref() {
            entities.push((EntityType::User, user));
        }
        if let Some(service) = event.service_identity.as_deref() {
            entities.push((EntityType::Service, service));
        }
        if let Some(secret) = event.secret_name.as_deref() {
            entities.push((EntityType::Secret, secret));
        }

        for (entity_type, entity_id) in entities {
            let key = Self::key(entity_type, entity_id);
            let baseline = self
                .baselines
                .entry(key)
                .or_insert_with(|| Baseline::new(entity_id, entity_type, ts));

            baseline.push_hour(ts.hour());

            if let Some(ip) = event.source_ip.as_deref() {
                baseline.typical_source_ips.insert(ip.to_string());
            }
            if let Some(secret) = event.secret_name.as_deref() {
                baseline.typical_secrets.insert(secret.to_string());
            }

            if entity_type == EntityType::Secret {
                update_frequency(baseline, ts);
            }

            baseline.last_updated = ts;
        }
    }

    /// Remove baselines idle longer than `max_age_days`. Returns how many
    /// were dropped.
    pub fn decay(&mut self, max_age_days: i64) -> usize {
        let cutoff = Utc::now() - Duration::days(max_age_days);
        let before = self.baselines.len();
        self.baselines.retain(|_, b| b.last_updated >= cutoff);

        let removed = before - self.baselines.len();
        if removed > 0 {
            log::info!("Baseline decay removed {} stale profiles", removed);
        }
        removed
    }
}

impl Default for BaselineStore {
    fn default() -> Self {
        Self::new()
    }
}

/// EWMA access frequency: freq' = freq*0.9 + (1/hours_since_update)*0.1.
/// Skipped when no time has passed since the last update.
fn update_frequency(baseline: &mut Baseline, ts: DateTime<Utc>) {
    let elapsed = ts.signed_duration_since(baseline.last_updated);
    let hours = elapsed.num_seconds() as f64 / 3600.0;
    if hours <= 0.0 {
        return;
    }

    baseline.typical_frequency = baseline.typical_frequency * 0.9 + (1.0 / hours) * 0.1;
}
