//! Incident Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::audit::AuditEvent;
use crate::logic::response::types::ResponseAction;
use crate::logic::threat::types::{Severity, ThreatCategory, ThreatSignal};

// ============================================================================
// INCIDENT
// ============================================================================

/// Raw material kept with every incident for audit / debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    pub event: AuditEvent,
    pub signals: Vec<ThreatSignal>,
}

/// One consolidated detection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Deterministic fingerprint of (timestamp, user identity, secret name)
    pub id: String,
    pub category: ThreatCategory,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub source_ip: Option<String>,
    pub user_identity: Option<String>,
    pub service_identity: Option<String>,
    pub secret_name: Option<String>,
    pub evidence: Evidence,
    /// 0.0 - 1.0, mean of signal confidences
    pub confidence: f64,
    pub response_action: Option<ResponseAction>,
    pub response_executed: bool,
    pub resolved: bool,
}

impl Incident {
    /// The identity the incident is attributed to: user first, then service
    pub fn identity(&self) -> Option<&str> {
        self.user_identity
            .as_deref()
            .or(self.service_identity.as_deref())
    }
}

/// Deterministic incident id from the identifying event fields
pub fn fingerprint(
    timestamp: DateTime<Utc>,
    user_identity: Option<&str>,
    secret_name: Option<&str>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(timestamp.to_rfc3339().as_bytes());
    hasher.update(b"|");
    hasher.update(user_identity.unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(secret_name.unwrap_or("").as_bytes());

    let digest = hasher.finalize();
    format!("inc-{}", &hex::encode(digest)[..16])
}

// ============================================================================
// QUERY FILTER
// ============================================================================

/// Filter for the incident query API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentFilter {
    pub severity: Option<Severity>,
    pub category: Option<ThreatCategory>,
    pub resolved: Option<bool>,
    pub limit: usize,
}

impl Default for IncidentFilter {
    fn default() -> Self {
        Self {
            severity: None,
            category: None,
            resolved: None,
            limit: 100,
        }
    }
}

impl IncidentFilter {
    pub fn matches(&self, incident: &Incident) -> bool {
        if let Some(severity) = self.severity {
            if incident.severity != severity {
                return false;
            }
        }
        if let Some(category) = self.category {
            if incident.category != category {
                return false;
            }
        }
        if let Some(resolved) = self.resolved {
            if incident.resolved != resolved {
                return false;
            }
        }
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint(ts("2026-03-01T12:00:00Z"), Some("alice"), Some("db/creds"));
        let b = fingerprint(ts("2026-03-01T12:00:00Z"), Some("alice"), Some("db/creds"));
        assert_eq!(a, b);
        assert!(a.starts_with("inc-"));
    }

    #[test]
    fn test_fingerprint_distinguishes_fields() {
        let base = fingerprint(ts("2026-03-01T12:00:00Z"), Some("alice"), Some("db/creds"));
        assert_ne!(
            base,
            fingerprint(ts("2026-03-01T12:00:01Z"), Some("alice"), Some("db/creds"))
        );
        assert_ne!(
            base,
            fingerprint(ts("2026-03-01T12:00:00Z"), Some("bob"), Some("db/creds"))
        );
        assert_ne!(
            base,
            fingerprint(ts("2026-03-01T12:00:00Z"), Some("alice"), None)
        );
    }
}
