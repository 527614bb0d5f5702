//! Incident Consolidator
//!
//! Merges one-or-more detector signals for a single event into one incident:
//! max severity by ordinal rank, mode category (ties to first encountered),
//! mean confidence.

use chrono::{DateTime, Utc};

use super::types::{fingerprint, Evidence, Incident};
use crate::logic::audit::AuditEvent;
use crate::logic::threat::types::{Severity, ThreatCategory, ThreatSignal};

/// Consolidate detector signals into a single incident.
///
/// `signals` must be non-empty; callers only reach this after at least one
/// detector fired.
pub fn consolidate(
    event: &AuditEvent,
    ts: DateTime<Utc>,
    signals: Vec<ThreatSignal>,
) -> Incident {
    debug_assert!(!signals.is_empty());

    let severity = signals
        .iter()
        .map(|s| s.severity)
        .max()
        .unwrap_or(Severity::Low);

    let category = mode_category(&signals);

    let confidence = if signals.is_empty() {
        0.0
    } else {
        signals.iter().map(|s| s.confidence).sum::<f64>() / signals.len() as f64
    };

    let id = fingerprint(ts, event.user_identity.as_deref(), event.secret_name.as_deref());

    Incident {
        id,
        category,
        severity,
        timestamp: ts,
        source_ip: event.source_ip.clone(),
        user_identity: event.user_identity.clone(),
        service_identity: event.service_identity.clone(),
        secret_name: event.secret_name.clone(),
        evidence: Evidence {
            event: event.clone(),
            signals,
        },
        confidence,
        response_action: None,
        response_executed: false,
        resolved: false,
    }
}

/// Most frequent category; ties broken by first-encountered order
fn mode_category(signals: &[ThreatSignal]) -> ThreatCategory {
    let mut best = signals[0].category;
    let mut best_count = 0;
    let mut seen: Vec<ThreatCategory> = Vec::new();

    for signal in signals {
        if seen.contains(&signal.category) {
            continue;
        }
        seen.push(signal.category);

        let count = signals
            .iter()
            .filter(|s| s.category == signal.category)
            .count();

        // Strictly-greater keeps the earliest category on ties
        if count > best_count {
            best = signal.category;
            best_count = count;
        }
    }

    best
}

// ============================================================================
// TESTS
// ============================================================================
