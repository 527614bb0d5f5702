//! Indicator Store
//!
//! Keyed by `kind:value`. Expiry is checked at lookup time, and the feed
//! refresher calls `sweep_expired` each cycle so stale entries do not
//! accumulate for the lifetime of the process.

use std::collections::HashMap;

use chrono::{Duration, Utc};

use super::types::{indicator_key, Indicator, IndicatorKind, IndicatorStats, IndicatorUpdate};
use crate::constants::DEFAULT_INDICATOR_CONFIDENCE;
use crate::logic::threat::types::{Severity, ThreatCategory};

pub struct IndicatorStore {
    indicators: HashMap<String, Indicator>,
    last_feed_sync: Option<i64>,
}

impl IndicatorStore {
    pub fn new() -> Self {
        Self {
            indicators: HashMap::new(),
            last_feed_sync: None,
        }
    }

    /// Insert or refresh indicators keyed by `kind:value`.
    ///
    /// Re-ingesting an existing key keeps `first_seen` and refreshes
    /// `last_seen`; confidence, TTL, severity and category are only
    /// overwritten when the update carries them explicitly. Returns the
    /// number of entries applied.
    pub fn upsert(&mut self, updates: Vec<IndicatorUpdate>) -> usize {
        let now = Utc::now();
        let mut applied = 0;

        for update in updates {
            if update.value.trim().is_empty() {
                continue;
            }

            let key = indicator_key(update.kind, &update.value);

            match self.indicators.get_mut(&key) {
                Some(existing) => {
                    existing.last_seen = now;
                    if let Some(confidence) = update.confidence {
                        existing.confidence = confidence.clamp(0.0, 1.0);
                    }
                    if let Some(ttl_days) = update.ttl_days {
                        existing.expires_at = Some(now + Duration::days(ttl_days));
                    }
                    if let Some(severity) = update.severity {
                        existing.severity = severity;
                    }
                    if let Some(category) = update.category {
                        existing.category = category;
                    }
                }
                None => {
                    let expires_at = Some(now + Duration::days(update.effective_ttl_days()));
                    self.indicators.insert(
                        key,
                        Indicator {
                            kind: update.kind,
                            value: update.value,
                            severity: update.severity.unwrap_or(Severity::Medium),
                            category: update.category.unwrap_or(ThreatCategory::IndicatorMatch),
                            source: update.source.unwrap_or_else(|| "manual".to_string()),
                            confidence: update
                                .confidence
                                .unwrap_or(DEFAULT_INDICATOR_CONFIDENCE)
                                .clamp(0.0, 1.0),
                            first_seen: now,
                            last_seen: now,
                            description: update.description.unwrap_or_default(),
                            references: update.references.unwrap_or_default(),
                            expires_at,
                        },
                    );
                }
            }
            applied += 1;
        }

        applied
    }

    /// Look up an indicator, treating expired entries as absent
    pub fn lookup(&self, kind: IndicatorKind, value: &str) -> Option<&Indicator> {
        let now = Utc::now();
        self.indicators
            .get(&indicator_key(kind, value))
            .filter(|ind| !ind.is_expired(now))
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn sweep_expired(&mut self) -> usize {
        let now = Utc::now();
        let before = self.indicators.len();
        self.indicators.retain(|_, ind| !ind.is_expired(now));
        before - self.indicators.len()
    }

    pub fn mark_feed_sync(&mut self) {
        self.last_feed_sync = Some(Utc::now().timestamp());
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    pub fn stats(&self) -> IndicatorStats {
        let mut ips = 0;
        let mut domains = 0;
        let mut hashes = 0;

        for ind in self.indicators.values() {
            match ind.kind {
                IndicatorKind::Ip => ips += 1,
                IndicatorKind::Domain => domains += 1,
                IndicatorKind::Hash => hashes += 1,
            }
        }

        IndicatorStats {
            total: self.indicators.len(),
            ips,
            domains,
            hashes,
            last_feed_sync: self.last_feed_sync,
        }
    }
}

impl Default for IndicatorStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
