//! Behavioral Baselines
//!
//! Per-entity learned profiles (user, service, secret). Only benign events
//! feed the baselines - an event that triggered an incident never does.

pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use store::BaselineStore;
pub use types::{Baseline, EntityType};
