//! Incidents
//!
//! Consolidation of detector signals into one incident per event, plus the
//! bounded incident / response history.

pub mod consolidator;
pub mod log;
pub mod types;

pub use consolidator::consolidate;
pub use log::EventLog;
pub use types::{Evidence, Incident, IncidentFilter};
