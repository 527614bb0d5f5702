//! Response Executor
//!
//! Runs the selected action through the injected collaborators. Handler
//! failures are caught and recorded; they never abort the detection path.

use std::sync::Arc;

use super::types::{
    AccessController, AlertPayload, AlertSink, ResponseAction, ResponseError, SecretRotator,
};
use crate::logic::incident::types::Incident;

/// Collaborators the executor dispatches to
pub struct ResponseHandlers {
    pub alert_sink: Arc<dyn AlertSink>,
    pub rotator: Arc<dyn SecretRotator>,
    pub access: Arc<dyn AccessController>,
}

/// Execute `action` for `incident`. Returns whether the handler succeeded.
///
/// Every action publishes an alert; failures of either the alert publish or
/// the action handler are logged and reported as `false`, never propagated.
pub fn execute_response(
    handlers: &ResponseHandlers,
    incident: &Incident,
    action: ResponseAction,
) -> bool {
    let payload = AlertPayload::new(
        &format!("{} detected", incident.category),
        &format!(
            "severity={} confidence={:.2} action={}",
            incident.severity, incident.confidence, action
        ),
        incident.severity,
        &incident.id,
        action,
    );

    let alert_ok = match handlers.alert_sink.publish(&payload) {
        Ok(()) => true,
        Err(e) => {
            log::error!("Alert publish failed for incident {}: {}", incident.id, e);
            false
        }
    };

    let action_result = run_handler(handlers, incident, action);

    match &action_result {
        Ok(()) => {
            log::info!("Executed {} for incident {}", action, incident.id);
        }
        Err(e) => {
            log::error!("Response {} failed for incident {}: {}", action, incident.id, e);
        }
    }

    alert_ok && action_result.is_ok()
}

fn run_handler(
    handlers: &ResponseHandlers,
    incident: &Incident,
    action: ResponseAction,
) -> Result<(), ResponseError> {
    match action {
        ResponseAction::AlertOnly => Ok(()),
        ResponseAction::RateLimit => {
            let identity = require_identity(incident, action)?;
            handlers.access.rate_limit(identity)
        }
        ResponseAction::BlockAccess => {
            let identity = require_identity(incident, action)?;
            handlers.access.block_access(identity)
        }
        ResponseAction::RotateSecret => {
            let secret = incident
                .secret_name
                .as_deref()
                .ok_or(ResponseError::MissingTarget {
                    action: action.as_str().to_string(),
                    field: "secret_name".to_string(),
                })?;
            handlers.rotator.rotate(secret)
        }
        ResponseAction::QuarantineUser => {
            let user = incident
                .user_identity
                .as_deref()
                .ok_or(ResponseError::MissingTarget {
                    action: action.as_str().to_string(),
                    field: "user_identity".to_string(),
                })?;
            handlers.access.quarantine_user(user)
        }
        ResponseAction::RevokeTokens => {
            let identity = require_identity(incident, action)?;
            handlers.access.revoke_tokens(identity)
        }
        ResponseAction::IsolateService => {
            let service =
                incident
                    .service_identity
                    .as_deref()
                    .ok_or(ResponseError::MissingTarget {
                        action: action.as_str().to_string(),
                        field: "service_identity".to_string(),
                    })?;
            handlers.access.isolate_service(service)
        }
        ResponseAction::EmergencyLockdown => handlers.access.lockdown(),
    }
}

fn require_identity<'a>(
    incident: &'a Incident,
    action: ResponseAction,
) -> Result<&'a str, ResponseError> {
    incident.identity().ok_or(ResponseError::MissingTarget {
        action: action.as_str().to_string(),
        field: "identity".to_string(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
