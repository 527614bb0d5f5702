//! Threat Types
//!
//! Core types for the detection pipeline. No logic here beyond ordinal
//! ranking - severities and categories compare by rank, never by label.

use serde::{Deserialize, Serialize};

// ============================================================================
// SEVERITY
// ============================================================================

/// Signal / incident severity with an explicit ordinal rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Ordinal rank: LOW < MEDIUM < HIGH < CRITICAL
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Low => 0,
            Severity::Medium => 1,
            Severity::High => 2,
            Severity::Critical => 3,
        }
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT CATEGORY
// ============================================================================

/// What kind of threat a signal or incident describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatCategory {
    AnomalousBehavior,
    BruteForce,
    PrivilegeEscalation,
    Exfiltration,
    Apt,
    Malware,
    /// Feed-sourced indicator hit with no finer classification
    IndicatorMatch,
}

impl ThreatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::AnomalousBehavior => "anomalous_behavior",
            ThreatCategory::BruteForce => "brute_force",
            ThreatCategory::PrivilegeEscalation => "privilege_escalation",
            ThreatCategory::Exfiltration => "exfiltration",
            ThreatCategory::Apt => "apt",
            ThreatCategory::Malware => "malware",
            ThreatCategory::IndicatorMatch => "indicator_match",
        }
    }
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// THREAT SIGNAL
// ============================================================================

/// One detector finding for one audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatSignal {
    pub category: ThreatCategory,
    pub severity: Severity,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub details: String,
}

impl ThreatSignal {
    pub fn new(
        category: ThreatCategory,
        severity: Severity,
        confidence: f64,
        details: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            confidence: confidence.clamp(0.0, 1.0),
            details: details.into(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
