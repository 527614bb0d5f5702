//! External Intelligence Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_INDICATOR_TTL_DAYS;
use crate::logic::threat::types::{Severity, ThreatCategory};

// ============================================================================
// INDICATOR
// ============================================================================

/// What kind of value an indicator carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorKind {
    Ip,
    Domain,
    Hash,
}

impl IndicatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Ip => "ip",
            IndicatorKind::Domain => "domain",
            IndicatorKind::Hash => "hash",
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One known-bad indicator with expiry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicator {
    pub kind: IndicatorKind,
    pub value: String,
    pub severity: Severity,
    pub category: ThreatCategory,
    pub source: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub description: String,
    pub references: Vec<String>,
    /// Inactive once now > expires_at
    pub expires_at: Option<DateTime<Utc>>,
}

impl Indicator {
    /// Store key: `kind:value`
    pub fn key(&self) -> String {
        indicator_key(self.kind, &self.value)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expiry) => now > expiry,
            None => false,
        }
    }
}

pub fn indicator_key(kind: IndicatorKind, value: &str) -> String {
    format!("{}:{}", kind.as_str(), value)
}

// ============================================================================
// BULK UPDATE API
// ============================================================================

/// One entry of the bulk indicator update API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorUpdate {
    pub kind: IndicatorKind,
    pub value: String,
    pub severity: Option<Severity>,
    pub category: Option<ThreatCategory>,
    pub source: Option<String>,
    pub confidence: Option<f64>,
    pub description: Option<String>,
    pub references: Option<Vec<String>>,
    pub ttl_days: Option<i64>,
}

impl IndicatorUpdate {
    pub fn new(kind: IndicatorKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            severity: None,
            category: None,
            source: None,
            confidence: None,
            description: None,
            references: None,
            ttl_days: None,
        }
    }

    pub fn effective_ttl_days(&self) -> i64 {
        self.ttl_days.unwrap_or(DEFAULT_INDICATOR_TTL_DAYS)
    }
}

// ============================================================================
// STORE STATS
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorStats {
    pub total: usize,
    pub ips: usize,
    pub domains: usize,
    pub hashes: usize,
    pub last_feed_sync: Option<i64>,
}
