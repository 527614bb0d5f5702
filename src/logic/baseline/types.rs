//! Baseline Types

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_HOUR_SAMPLES;

/// Which kind of entity a baseline profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    User,
    Service,
    Secret,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Service => "service",
            EntityType::Secret => "secret",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Learned normal-behavior profile for one entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Baseline {
    pub entity_id: String,
    pub entity_type: EntityType,
    /// Raw hour samples (0-23), bounded history
    pub typical_hours: Vec<u32>,
    /// EWMA of accesses per hour; only maintained for secret baselines
    pub typical_frequency: f64,
    pub typical_secrets: HashSet<String>,
    pub typical_source_ips: HashSet<String>,
    pub last_updated: DateTime<Utc>,
}

impl Baseline {
    pub fn new(entity_id: &str, entity_type: EntityType, now: DateTime<Utc>) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            entity_type,
            typical_hours: Vec::new(),
            typical_frequency: 0.0,
            typical_secrets: HashSet::new(),
            typical_source_ips: HashSet::new(),
            last_updated: now,
        }
    }

    /// Record an hour sample, dropping the oldest when the history is full
    pub fn push_hour(&mut self, hour: u32) {
        if self.typical_hours.len() >= MAX_HOUR_SAMPLES {
            self.typical_hours.remove(0);
        }
        self.typical_hours.push(hour);
    }

    /// Fraction of recorded hours within +-2 (wrapping mod 24) of `hour`
    pub fn hour_fraction_near(&self, hour: u32) -> f64 {
        if self.typical_hours.is_empty() {
            return 0.0;
        }

        let near = self
            .typical_hours
            .iter()
            .filter(|&&h| hour_distance(h, hour) <= 2)
            .count();

        near as f64 / self.typical_hours.len() as f64
    }
}

/// Circular distance between two hours of day
pub fn hour_distance(a: u32, b: u32) -> u32 {
    let diff = (a as i32 - b as i32).unsigned_abs() % 24;
    diff.min(24 - diff)
}
