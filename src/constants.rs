//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change a default interval or threshold, only edit this file.

/// Default indicator time-to-live (days)
pub const DEFAULT_INDICATOR_TTL_DAYS: i64 = 30;

/// TTL for feed-sourced IP indicators (days)
pub const FEED_INDICATOR_TTL_DAYS: i64 = 7;

/// Default confidence assigned to manually ingested indicators
pub const DEFAULT_INDICATOR_CONFIDENCE: f64 = 0.8;

/// Confidence assigned to feed-sourced indicators
pub const FEED_INDICATOR_CONFIDENCE: f64 = 0.7;

/// Baselines untouched for this many days are dropped by the maintainer
pub const DEFAULT_BASELINE_MAX_AGE_DAYS: i64 = 30;

/// Capacity of the bounded incident / response history
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 10_000;

/// Capacity of the recent raw-event ring scanned by pattern heuristics
pub const RECENT_EVENT_CAPACITY: usize = 1_000;

/// Per-baseline cap on recorded hour samples
pub const MAX_HOUR_SAMPLES: usize = 2_000;

/// Feed refresh interval (seconds)
pub const DEFAULT_FEED_REFRESH_INTERVAL: u64 = 3_600;

/// Baseline maintenance interval (seconds)
pub const DEFAULT_BASELINE_MAINT_INTERVAL: u64 = 1_800;

/// Threat hunting interval (seconds)
pub const DEFAULT_HUNT_INTERVAL: u64 = 3_600;

/// Worker retry interval after a failed cycle (seconds)
pub const DEFAULT_WORKER_RETRY_INTERVAL: u64 = 300;

/// Feed fetch timeout (seconds)
pub const FEED_FETCH_TIMEOUT_SECS: u64 = 30;

/// Hunting window (hours)
pub const HUNT_WINDOW_HOURS: i64 = 24;

/// Identities with more incidents than this in the hunt window get flagged
pub const HUNT_INCIDENT_THRESHOLD: usize = 5;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Secrets-Sentry";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get feed refresh interval from environment or use default
pub fn get_feed_refresh_interval() -> u64 {
    std::env::var("SENTRY_FEED_REFRESH_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FEED_REFRESH_INTERVAL)
}

/// Get baseline maintenance interval from environment or use default
pub fn get_baseline_maint_interval() -> u64 {
    std::env::var("SENTRY_BASELINE_MAINT_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_BASELINE_MAINT_INTERVAL)
}

/// Get threat hunting interval from environment or use default
pub fn get_hunt_interval() -> u64 {
    std::env::var("SENTRY_HUNT_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_HUNT_INTERVAL)
}

/// Check if background feed sync is enabled
pub fn is_feed_sync_enabled() -> bool {
    std::env::var("SENTRY_FEED_SYNC_ENABLED")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}
