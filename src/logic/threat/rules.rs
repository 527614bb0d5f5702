//! Detection Thresholds
//!
//! Tunable knobs for the behavioral and pattern detectors. Defaults mirror
//! production tuning; tests override individual fields.

use serde::{Deserialize, Serialize};

/// How many entries of the recent-event ring the brute-force check scans
pub const BRUTE_FORCE_SCAN_DEPTH: usize = 100;

/// How many entries of the recent-event ring the exfiltration check scans
pub const EXFIL_SCAN_DEPTH: usize = 50;

/// Failures by one identity inside the window before brute force fires
pub const BRUTE_FORCE_FAILURE_LIMIT: usize = 10;

/// Distinct secrets read by one identity inside the window before
/// an exfiltration burst fires
pub const EXFIL_DISTINCT_SECRET_LIMIT: usize = 5;

/// Brute-force trailing window (minutes)
pub const BRUTE_FORCE_WINDOW_MINUTES: i64 = 60;

/// Exfiltration-burst trailing window (minutes)
pub const EXFIL_WINDOW_MINUTES: i64 = 10;

/// Excessive-access trailing window (minutes)
pub const ACCESS_FREQUENCY_WINDOW_MINUTES: i64 = 60;

/// Behavioral detector thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionThresholds {
    /// Fraction of recorded hours near the event hour below which the
    /// unusual-time signal fires
    pub unusual_time_threshold: f64,
    /// Confidence assigned to a never-seen source IP
    pub new_ip_threshold: f64,
    /// Confidence assigned to a never-seen secret access
    pub secret_anomaly_threshold: f64,
    /// Multiplier over typical frequency before excessive access fires
    pub access_frequency_multiplier: f64,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            unusual_time_threshold: 0.1,
            new_ip_threshold: 0.8,
            secret_anomaly_threshold: 0.7,
            access_frequency_multiplier: 5.0,
        }
    }
}
