//! Background Workers
//!
//! Three independently scheduled loops sharing the engine state: feed
//! refresh, baseline maintenance, and proactive threat hunting. Each loop
//! catches its own failures, falls back to the retry interval, and never
//! crashes. A shutdown channel per loop makes stopping deterministic.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;

use super::config::EngineConfig;
use super::engine::EngineState;
use super::external_intel::feed::fetch_feed;
use crate::constants::{HUNT_INCIDENT_THRESHOLD, HUNT_WINDOW_HOURS};

// ============================================================================
// WORKER HANDLE
// ============================================================================

pub(crate) struct WorkerHandle {
    name: &'static str,
    shutdown_tx: Sender<()>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    fn stop(self) {
        // A closed channel also stops the loop; ignore send errors
        let _ = self.shutdown_tx.send(());
        if self.join.join().is_err() {
            log::error!("Worker '{}' panicked during shutdown", self.name);
        }
    }
}

/// All three loops for one engine instance
pub(crate) struct WorkerSet {
    handles: Vec<WorkerHandle>,
}

impl WorkerSet {
    pub(crate) fn spawn(config: EngineConfig, state: Arc<Mutex<EngineState>>) -> Self {
        let handles = vec![
            spawn_loop(
                "feed-refresher",
                config.feed_refresh_interval,
                config.worker_retry_interval,
                {
                    let state = Arc::clone(&state);
                    let sources = config.feed_sources.clone();
                    move || refresh_feeds(&state, &sources)
                },
            ),
            spawn_loop(
                "baseline-maintainer",
                config.baseline_maint_interval,
                config.worker_retry_interval,
                {
                    let state = Arc::clone(&state);
                    let max_age = config.baseline_max_age_days;
                    move || {
                        state.lock().baselines.decay(max_age);
                        Ok(())
                    }
                },
            ),
            spawn_loop(
                "threat-hunter",
                config.hunt_interval,
                config.worker_retry_interval,
                {
                    let state = Arc::clone(&state);
                    move || {
                        hunt_repeat_offenders(&state);
                        Ok(())
                    }
                },
            ),
        ];

        Self { handles }
    }

    pub(crate) fn shutdown(self) {
        for handle in self.handles {
            handle.stop();
        }
    }
}

// ============================================================================
// LOOP SCAFFOLD
// ============================================================================

/// Run `tick` forever, work first and sleep after: the first cycle runs
/// right at spawn, then the loop waits the normal interval after success or
/// the retry interval after failure. A shutdown signal exits immediately.
fn spawn_loop<F>(
    name: &'static str,
    interval: Duration,
    retry_interval: Duration,
    mut tick: F,
) -> WorkerHandle
where
    F: FnMut() -> Result<(), String> + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

    let join = thread::spawn(move || {
        log::info!("Worker '{}' started (interval {:?})", name, interval);

        loop {
            let next_wait = match tick() {
                Ok(()) => interval,
                Err(e) => {
                    log::warn!(
                        "Worker '{}' cycle failed: {} (retrying in {:?})",
                        name,
                        e,
                        retry_interval
                    );
                    retry_interval
                }
            };

            match shutdown_rx.recv_timeout(next_wait) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    log::info!("Worker '{}' shutting down", name);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    });

    WorkerHandle {
        name,
        shutdown_tx,
        join,
    }
}

// ============================================================================
// FEED REFRESHER
// ============================================================================

fn refresh_feeds(
    state: &Arc<Mutex<EngineState>>,
    sources: &[super::external_intel::feed::FeedSource],
) -> Result<(), String> {
    if !crate::constants::is_feed_sync_enabled() {
        return Ok(());
    }

    let mut synced = 0;
    let mut errors = Vec::new();

    for source in sources.iter().filter(|s| s.enabled) {
        // Fetch without holding the lock; the bounded timeout is the only
        // long wait in the system
        match fetch_feed(source) {
            Ok(updates) => {
                let count = updates.len();
                state.lock().indicators.upsert(updates);
                log::info!("Synced {} indicators from {}", count, source.name);
                synced += 1;
            }
            Err(e) => {
                log::warn!("Failed to sync {}: {}", source.name, e);
                errors.push(e.to_string());
            }
        }
    }

    {
        let mut guard = state.lock();
        let removed = guard.indicators.sweep_expired();
        if removed > 0 {
            log::info!("Swept {} expired indicators", removed);
        }
        if synced > 0 {
            guard.indicators.mark_feed_sync();
        }
    }

    if synced == 0 && !errors.is_empty() {
        return Err(errors.join("; "));
    }
    Ok(())
}

// ============================================================================
// THREAT HUNTER
// ============================================================================

/// Flag identities with an unusual incident count in the trailing window.
/// Log-level warning only - hunting never takes automated action.
fn hunt_repeat_offenders(state: &Arc<Mutex<EngineState>>) {
    let counts = state
        .lock()
        .log
        .incidents_by_identity_within(Utc::now(), chrono::Duration::hours(HUNT_WINDOW_HOURS));

    for (identity, count) in counts {
        if count > HUNT_INCIDENT_THRESHOLD {
            log::warn!(
                "[HUNT] identity '{}' has {} incidents in the last {}h",
                identity,
                count,
                HUNT_WINDOW_HOURS
            );
        }
    }
}
