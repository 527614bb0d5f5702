//! Threat Detection Pipeline
//!
//! Three detectors run per audit event: indicator match, behavioral
//! anomaly against learned baselines, and stateless attack-pattern
//! heuristics over recent event history.

pub mod detectors;
pub mod rules;
pub mod types;

pub use detectors::{run_detectors, RecentEvents};
pub use types::{Severity, ThreatCategory, ThreatSignal};
