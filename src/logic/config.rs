//! Engine Configuration
//!
//! All tunables for one engine instance. Constructed explicitly and passed
//! to `SecurityEngine::new` - there is no process-wide config singleton.

use std::time::Duration;

use crate::constants::{
    DEFAULT_BASELINE_MAX_AGE_DAYS, DEFAULT_EVENT_LOG_CAPACITY, DEFAULT_WORKER_RETRY_INTERVAL,
};
use crate::logic::external_intel::feed::FeedSource;
use crate::logic::response::types::ResponseAction;
use crate::logic::threat::rules::DetectionThresholds;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub thresholds: DetectionThresholds,

    /// Most invasive action the engine may execute automatically
    pub max_response_level: ResponseAction,

    /// Incident / response history capacity (FIFO beyond this)
    pub event_log_capacity: usize,

    /// Baselines idle longer than this are decayed
    pub baseline_max_age_days: i64,

    /// Threat feeds polled by the feed refresher
    pub feed_sources: Vec<FeedSource>,

    pub feed_refresh_interval: Duration,
    pub baseline_maint_interval: Duration,
    pub hunt_interval: Duration,
    /// Interval used after a worker cycle fails
    pub worker_retry_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: DetectionThresholds::default(),
            max_response_level: ResponseAction::RotateSecret,
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
            baseline_max_age_days: DEFAULT_BASELINE_MAX_AGE_DAYS,
            feed_sources: Vec::new(),
            feed_refresh_interval: Duration::from_secs(crate::constants::get_feed_refresh_interval()),
            baseline_maint_interval: Duration::from_secs(
                crate::constants::get_baseline_maint_interval(),
            ),
            hunt_interval: Duration::from_secs(crate::constants::get_hunt_interval()),
            worker_retry_interval: Duration::from_secs(DEFAULT_WORKER_RETRY_INTERVAL),
        }
    }
}
