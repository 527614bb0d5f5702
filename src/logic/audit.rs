//! Audit Event Input
//!
//! One audit event per detection call, as emitted by the secret-management
//! host system. The timestamp is required and must be RFC3339; everything
//! else is optional and detector-dependent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit log entry from the secret-management system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditEvent {
    /// RFC3339 timestamp, required
    pub timestamp: String,
    pub source_ip: Option<String>,
    pub user_identity: Option<String>,
    pub service_identity: Option<String>,
    pub secret_name: Option<String>,
    pub operation: Option<String>,
    pub status: Option<String>,
}

impl AuditEvent {
    /// Validate the caller contract and return the parsed timestamp.
    ///
    /// A missing or unparseable timestamp is rejected here instead of
    /// failing somewhere mid-pipeline.
    pub fn validate(&self) -> Result<DateTime<Utc>, AuditEventError> {
        if self.timestamp.trim().is_empty() {
            return Err(AuditEventError::MissingTimestamp);
        }

        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|e| AuditEventError::MalformedTimestamp {
                raw: self.timestamp.clone(),
                message: e.to_string(),
            })
    }

    /// The acting identity: user first, then service
    pub fn identity(&self) -> Option<&str> {
        self.user_identity
            .as_deref()
            .or(self.service_identity.as_deref())
    }

    /// Did the operation fail or get denied?
    pub fn is_failure(&self) -> bool {
        match self.status.as_deref() {
            Some(s) => {
                s.eq_ignore_ascii_case("failure")
                    || s.eq_ignore_ascii_case("failed")
                    || s.eq_ignore_ascii_case("denied")
            }
            None => false,
        }
    }

    /// A successful read of a secret (status absent counts as success)
    pub fn is_successful_read(&self) -> bool {
        let read_op = matches!(
            self.operation.as_deref(),
            Some(op) if op.eq_ignore_ascii_case("read") || op.eq_ignore_ascii_case("get")
        );

        let ok = match self.status.as_deref() {
            Some(s) => s.eq_ignore_ascii_case("success") || s.eq_ignore_ascii_case("ok"),
            None => true,
        };

        read_op && ok
    }
}

/// Audit event contract violations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditEventError {
    /// Timestamp field is empty
    MissingTimestamp,
    /// Timestamp is not RFC3339
    MalformedTimestamp { raw: String, message: String },
}

impl std::fmt::Display for AuditEventError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditEventError::MissingTimestamp => write!(f, "audit event has no timestamp"),
            AuditEventError::MalformedTimestamp { raw, message } => {
                write!(f, "timestamp '{}' is not RFC3339: {}", raw, message)
            }
        }
    }
}

impl std::error::Error for AuditEventError {}

// ============================================================================
// TESTS
// ============================================================================
