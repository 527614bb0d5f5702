//! Threat Feed Ingestion
//!
//! Mục đích: sync known-bad IP indicators từ các threat intelligence feeds.
//!
//! Feed bodies are line-oriented: one indicator value per line, blank lines
//! and `#` comments ignored.

use std::time::Duration;

use super::types::{IndicatorKind, IndicatorUpdate};
use crate::constants::{FEED_FETCH_TIMEOUT_SECS, FEED_INDICATOR_CONFIDENCE, FEED_INDICATOR_TTL_DAYS};
use crate::logic::threat::types::Severity;

// ============================================================================
// FEED SOURCES
// ============================================================================

/// One configured feed endpoint
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
    pub enabled: bool,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            enabled: true,
        }
    }
}

/// Feed fetch / parse failures
#[derive(Debug, Clone)]
pub enum FeedError {
    /// HTTP request failed or timed out
    FetchFailed { source: String, message: String },
    /// Body could not be read as text
    BodyUnreadable { source: String, message: String },
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::FetchFailed { source, message } => {
                write!(f, "feed '{}' fetch failed: {}", source, message)
            }
            FeedError::BodyUnreadable { source, message } => {
                write!(f, "feed '{}' body unreadable: {}", source, message)
            }
        }
    }
}

impl std::error::Error for FeedError {}

// ============================================================================
// FETCH & PARSE
// ============================================================================

/// Fetch one feed (blocking, bounded timeout) and parse its lines into
/// IP indicator updates.
pub fn fetch_feed(source: &FeedSource) -> Result<Vec<IndicatorUpdate>, FeedError> {
    let response = ureq::get(&source.url)
        .timeout(Duration::from_secs(FEED_FETCH_TIMEOUT_SECS))
        .call()
        .map_err(|e| FeedError::FetchFailed {
            source: source.name.clone(),
            message: e.to_string(),
        })?;

    let body = response
        .into_string()
        .map_err(|e| FeedError::BodyUnreadable {
            source: source.name.clone(),
            message: e.to_string(),
        })?;

    Ok(parse_feed_lines(&body, &source.name))
}

/// Parse a line-oriented feed body into indicator updates.
///
/// Feed-sourced IP indicators get the short TTL and the feed confidence.
pub fn parse_feed_lines(body: &str, source_name: &str) -> Vec<IndicatorUpdate> {
    let mut updates = Vec::new();

    for line in body.lines() {
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        let mut update = IndicatorUpdate::new(IndicatorKind::Ip, line);
        update.severity = Some(Severity::Medium);
        update.confidence = Some(FEED_INDICATOR_CONFIDENCE);
        update.source = Some(source_name.to_string());
        update.ttl_days = Some(FEED_INDICATOR_TTL_DAYS);
        updates.push(update);
    }

    updates
}

// ============================================================================
// TESTS
// ============================================================================
