//! Secrets Sentry Core - Threat Detection & Response Engine
//!
//! Ingests audit events from a secret-management system, classifies them
//! against known indicators and learned per-entity behavior, consolidates
//! detector signals into incidents, and executes a capped automated
//! response. Background workers keep the indicator feeds, baselines and
//! incident history maintained.

pub mod constants;
pub mod logic;

pub use logic::audit::AuditEvent;
pub use logic::config::EngineConfig;
pub use logic::engine::{EngineError, SecurityEngine};
pub use logic::external_intel::feed::FeedSource;
pub use logic::external_intel::types::{IndicatorKind, IndicatorUpdate};
pub use logic::incident::types::{Incident, IncidentFilter};
pub use logic::response::types::{
    AccessController, AlertSink, ResponseAction, ResponseRecord, SecretRotator,
};
pub use logic::threat::types::{Severity, ThreatCategory};
