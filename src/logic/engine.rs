//! Security Engine
//!
//! The engine handle owns the three stores behind one mutex and the injected
//! response collaborators. One detection call runs threat-check ->
//! consolidation -> response -> log-append atomically under a single lock
//! acquisition; background workers share the same lock for their critical
//! sections and sleep unlocked.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use super::audit::{AuditEvent, AuditEventError};
use super::baseline::store::BaselineStore;
use super::config::EngineConfig;
use super::external_intel::store::IndicatorStore;
use super::external_intel::types::{IndicatorStats, IndicatorUpdate};
use super::incident::consolidator::consolidate;
use super::incident::log::EventLog;
use super::incident::types::{Incident, IncidentFilter};
use super::response::executor::{execute_response, ResponseHandlers};
use super::response::matrix::{clamp_to_ceiling, select_action};
use super::response::types::{
    AccessController, AlertSink, ResponseRecord, SecretRotator,
};
use super::threat::detectors::{run_detectors, RecentEvents};
use super::workers::WorkerSet;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone)]
pub enum EngineError {
    /// The audit event violates the caller contract
    InvalidEvent(AuditEventError),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidEvent(e) => write!(f, "invalid audit event: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<AuditEventError> for EngineError {
    fn from(e: AuditEventError) -> Self {
        EngineError::InvalidEvent(e)
    }
}

// ============================================================================
// SHARED STATE
// ============================================================================

/// Everything the detection path and the workers mutate, behind one lock
pub(crate) struct EngineState {
    pub indicators: IndicatorStore,
    pub baselines: BaselineStore,
    pub log: EventLog,
    pub recent: RecentEvents,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct SecurityEngine {
    config: EngineConfig,
    state: Arc<Mutex<EngineState>>,
    handlers: ResponseHandlers,
    workers: Mutex<Option<WorkerSet>>,
}

impl SecurityEngine {
    pub fn new(
        config: EngineConfig,
        alert_sink: Arc<dyn AlertSink>,
        rotator: Arc<dyn SecretRotator>,
        access: Arc<dyn AccessController>,
    ) -> Self {
        let state = EngineState {
            indicators: IndicatorStore::new(),
            baselines: BaselineStore::new(),
            log: EventLog::new(config.event_log_capacity),
            recent: RecentEvents::new(),
        };

        Self {
            config,
            state: Arc::new(Mutex::new(state)),
            handlers: ResponseHandlers {
                alert_sink,
                rotator,
                access,
            },
            workers: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Process one audit event: detect, consolidate, respond, record.
    ///
    /// Returns the incident when at least one detector fired, `None` for a
    /// benign event (which instead feeds the baselines).
    pub fn process_event(&self, event: &AuditEvent) -> Result<Option<Incident>, EngineError> {
        let ts = event.validate()?;

        let mut state = self.state.lock();
        state.recent.push(ts, event.clone());

        let signals = run_detectors(
            event,
            ts,
            &state.indicators,
            &state.baselines,
            &state.log,
            &state.recent,
            &self.config.thresholds,
        );

        if signals.is_empty() {
            // Benign learning only happens when no threat was detected
            state.baselines.record_benign_activity(event, ts);
            return Ok(None);
        }

        let mut incident = consolidate(event, ts, signals);
        log::warn!(
            "Incident {}: {} / {} (confidence {:.2})",
            incident.id,
            incident.severity,
            incident.category,
            incident.confidence
        );

        let action = clamp_to_ceiling(
            select_action(incident.severity, incident.category),
            self.config.max_response_level,
        );

        let succeeded = execute_response(&self.handlers, &incident, action);
        incident.response_action = Some(action);
        incident.response_executed = succeeded;

        state
            .log
            .push_response(ResponseRecord::new(&incident.id, action, succeeded));
        state.log.push_incident(incident.clone());

        Ok(Some(incident))
    }

    /// Bulk indicator update API. Returns the number of entries applied.
    pub fn update_indicators(&self, updates: Vec<IndicatorUpdate>) -> usize {
        let applied = self.state.lock().indicators.upsert(updates);
        log::info!("Applied {} indicator updates", applied);
        applied
    }

    /// Query incidents newest-first, filtered and capped
    pub fn get_incidents(&self, filter: &IncidentFilter) -> Vec<Incident> {
        self.state.lock().log.query(filter)
    }

    /// Mark an incident resolved
    pub fn resolve_incident(&self, incident_id: &str) -> bool {
        self.state.lock().log.resolve(incident_id)
    }

    /// Latest response records, newest-first
    pub fn get_response_records(&self, limit: usize) -> Vec<ResponseRecord> {
        self.state.lock().log.recent_responses(limit)
    }

    pub fn indicator_stats(&self) -> IndicatorStats {
        self.state.lock().indicators.stats()
    }

    pub fn baseline_count(&self) -> usize {
        self.state.lock().baselines.len()
    }

    /// Spawn the three background workers. Idempotent: calling twice keeps
    /// the first set.
    pub fn start_workers(&self) {
        let mut guard = self.workers.lock();
        if guard.is_some() {
            log::debug!("Workers already running, skipping start");
            return;
        }
        *guard = Some(WorkerSet::spawn(self.config.clone(), Arc::clone(&self.state)));
        log::info!("Background workers started");
    }

    /// Signal every worker loop and join. Deterministic stop for tests and
    /// graceful process shutdown.
    pub fn shutdown(&self) {
        if let Some(workers) = self.workers.lock().take() {
            workers.shutdown();
            log::info!("Background workers stopped");
        }
    }

    /// Run one baseline decay pass immediately (the maintenance worker does
    /// this on its own schedule).
    pub fn run_baseline_decay(&self) -> usize {
        self.state.lock().baselines.decay(self.config.baseline_max_age_days)
    }

    /// Seconds since the last successful feed sync, if any
    pub fn seconds_since_feed_sync(&self) -> Option<i64> {
        self.state
            .lock()
            .indicators
            .stats()
            .last_feed_sync
            .map(|t| Utc::now().timestamp() - t)
    }
}

impl Drop for SecurityEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// TESTS
// ============================================================================
