//! Automated Response
//!
//! Escalation matrix, response ceiling, and handler execution through
//! injected collaborators.

pub mod executor;
pub mod matrix;
pub mod types;

pub use executor::execute_response;
pub use matrix::{clamp_to_ceiling, select_action};
pub use types::{
    AccessController, AlertPayload, AlertSink, LogAlertSink, NoopAccessController,
    NoopSecretRotator, ResponseAction, ResponseError, ResponseRecord, SecretRotator,
};
