//! Escalation Matrix
//!
//! Maps (severity, category) to an automated action, with a per-severity
//! default, then clamps the result to the configured response ceiling by
//! ordinal rank.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::types::ResponseAction;
use crate::logic::threat::types::{Severity, ThreatCategory};

static ESCALATION_MATRIX: Lazy<HashMap<(Severity, ThreatCategory), ResponseAction>> =
    Lazy::new(|| {
        use ResponseAction::*;
        use Severity::*;
        use ThreatCategory::*;

        let mut m = HashMap::new();
        m.insert((Critical, Exfiltration), EmergencyLockdown);
        m.insert((Critical, Apt), IsolateService);
        m.insert((Critical, Malware), QuarantineUser);
        m.insert((High, BruteForce), BlockAccess);
        m.insert((High, PrivilegeEscalation), RevokeTokens);
        m.insert((Medium, AnomalousBehavior), RateLimit);
        m
    });

/// Default action when a category has no explicit mapping
fn severity_default(severity: Severity) -> ResponseAction {
    match severity {
        Severity::Critical | Severity::High => ResponseAction::RotateSecret,
        Severity::Medium | Severity::Low => ResponseAction::AlertOnly,
    }
}

/// Pick the matrix action for an incident
pub fn select_action(severity: Severity, category: ThreatCategory) -> ResponseAction {
    ESCALATION_MATRIX
        .get(&(severity, category))
        .copied()
        .unwrap_or_else(|| severity_default(severity))
}

/// Enforce the response ceiling: if the computed action outranks it,
/// substitute the ceiling action itself.
pub fn clamp_to_ceiling(action: ResponseAction, ceiling: ResponseAction) -> ResponseAction {
    if action.rank() > ceiling.rank() {
        ceiling
    } else {
        action
    }
}

// ============================================================================
// TESTS
// ============================================================================
