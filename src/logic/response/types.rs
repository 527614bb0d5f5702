//! Response Types
//!
//! Actions carry an explicit ordinal rank; the response ceiling compares
//! ranks, never label strings.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::logic::threat::types::Severity;

// ============================================================================
// RESPONSE ACTION
// ============================================================================

/// Automated action the engine may take for an incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseAction {
    AlertOnly,
    RateLimit,
    BlockAccess,
    RotateSecret,
    QuarantineUser,
    RevokeTokens,
    IsolateService,
    EmergencyLockdown,
}

impl ResponseAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseAction::AlertOnly => "alert_only",
            ResponseAction::RateLimit => "rate_limit",
            ResponseAction::BlockAccess => "block_access",
            ResponseAction::RotateSecret => "rotate_secret",
            ResponseAction::QuarantineUser => "quarantine_user",
            ResponseAction::RevokeTokens => "revoke_tokens",
            ResponseAction::IsolateService => "isolate_service",
            ResponseAction::EmergencyLockdown => "emergency_lockdown",
        }
    }

    /// Ordinal rank of how invasive the action is
    pub fn rank(&self) -> u8 {
        match self {
            ResponseAction::AlertOnly => 0,
            ResponseAction::RateLimit => 1,
            ResponseAction::BlockAccess => 2,
            ResponseAction::RotateSecret => 3,
            ResponseAction::QuarantineUser => 4,
            ResponseAction::RevokeTokens => 5,
            ResponseAction::IsolateService => 6,
            ResponseAction::EmergencyLockdown => 7,
        }
    }
}

impl std::fmt::Display for ResponseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RESPONSE RECORD
// ============================================================================

/// Append-only record of one executed (or failed) response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: String,
    pub incident_id: String,
    pub action: ResponseAction,
    pub timestamp: i64,
    pub succeeded: bool,
}

impl ResponseRecord {
    pub fn new(incident_id: &str, action: ResponseAction, succeeded: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            incident_id: incident_id.to_string(),
            action,
            timestamp: Utc::now().timestamp(),
            succeeded,
        }
    }
}

// ============================================================================
// ALERT PAYLOAD
// ============================================================================

/// Alert sent to the configured sink for every incident response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: i64,
    pub hostname: Option<String>,
    pub incident_id: String,
    pub action: ResponseAction,
}

impl AlertPayload {
    pub fn new(
        title: &str,
        message: &str,
        severity: Severity,
        incident_id: &str,
        action: ResponseAction,
    ) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            severity,
            timestamp: Utc::now().timestamp(),
            hostname: hostname::get().ok().map(|h| h.to_string_lossy().to_string()),
            incident_id: incident_id.to_string(),
            action,
        }
    }
}

// ============================================================================
// RESPONSE ERROR
// ============================================================================

/// Handler / collaborator failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponseError {
    /// The alert sink rejected the publish
    AlertFailed { message: String },
    /// The secret-rotation collaborator failed
    RotationFailed { secret: String, message: String },
    /// Access-control handler failed
    ControlFailed { action: String, message: String },
    /// Action needs a field the incident does not carry
    MissingTarget { action: String, field: String },
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseError::AlertFailed { message } => write!(f, "alert publish failed: {}", message),
            ResponseError::RotationFailed { secret, message } => {
                write!(f, "rotation of '{}' failed: {}", secret, message)
            }
            ResponseError::ControlFailed { action, message } => {
                write!(f, "{} failed: {}", action, message)
            }
            ResponseError::MissingTarget { action, field } => {
                write!(f, "{} skipped: incident has no {}", action, field)
            }
        }
    }
}

impl std::error::Error for ResponseError {}

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Outbound alert publish sink (topic / channel abstraction)
pub trait AlertSink: Send + Sync {
    fn publish(&self, payload: &AlertPayload) -> Result<(), ResponseError>;
}

/// External secret-rotation capability
pub trait SecretRotator: Send + Sync {
    fn rotate(&self, secret_name: &str) -> Result<(), ResponseError>;
}

/// Access-control plane the invasive actions execute against
pub trait AccessController: Send + Sync {
    fn rate_limit(&self, identity: &str) -> Result<(), ResponseError>;
    fn block_access(&self, identity: &str) -> Result<(), ResponseError>;
    fn quarantine_user(&self, user: &str) -> Result<(), ResponseError>;
    fn revoke_tokens(&self, identity: &str) -> Result<(), ResponseError>;
    fn isolate_service(&self, service: &str) -> Result<(), ResponseError>;
    fn lockdown(&self) -> Result<(), ResponseError>;
}

// ============================================================================
// DEFAULT IMPLEMENTATIONS
// ============================================================================

/// Sink that writes alerts to the log only
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn publish(&self, payload: &AlertPayload) -> Result<(), ResponseError> {
        let body = serde_json::to_string(payload).map_err(|e| ResponseError::AlertFailed {
            message: e.to_string(),
        })?;
        log::warn!("[ALERT] {}", body);
        Ok(())
    }
}

/// Rotator stub for deployments without a rotation capability
pub struct NoopSecretRotator;

impl SecretRotator for NoopSecretRotator {
    fn rotate(&self, secret_name: &str) -> Result<(), ResponseError> {
        log::info!("Rotation requested for '{}' (noop rotator)", secret_name);
        Ok(())
    }
}

/// Access controller that acknowledges every action without side effects
pub struct NoopAccessController;

impl AccessController for NoopAccessController {
    fn rate_limit(&self, identity: &str) -> Result<(), ResponseError> {
        log::info!("Rate limit applied to '{}' (noop controller)", identity);
        Ok(())
    }

    fn block_access(&self, identity: &str) -> Result<(), ResponseError> {
        log::info!("Access blocked for '{}' (noop controller)", identity);
        Ok(())
    }

    fn quarantine_user(&self, user: &str) -> Result<(), ResponseError> {
        log::info!("User '{}' quarantined (noop controller)", user);
        Ok(())
    }

    fn revoke_tokens(&self, identity: &str) -> Result<(), ResponseError> {
        log::info!("Tokens revoked for '{}' (noop controller)", identity);
        Ok(())
    }

    fn isolate_service(&self, service: &str) -> Result<(), ResponseError> {
        log::info!("Service '{}' isolated (noop controller)", service);
        Ok(())
    }

    fn lockdown(&self) -> Result<(), ResponseError> {
        log::warn!("Emergency lockdown broadcast (noop controller)");
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
