use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Snapshot of the controller's counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatus {
    pub busy: bool,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub cycles_skipped: u64,
    pub last_completed_at: Option<DateTime<Utc>>,
    pub last_duration_ms: Option<u64>,
    pub last_error: Option<String>,
}

#[derive(Default)]
struct Stats {
    cycles_completed: u64,
    cycles_failed: u64,
    cycles_skipped: u64,
    last_completed_at: Option<DateTime<Utc>>,
    last_duration_ms: Option<u64>,
    last_error: Option<String>,
}

/// Single-flight gate for collection cycles
pub struct CycleController {
    busy: AtomicBool,
    stats: RwLock<Stats>,
}

impl CycleController {
    pub fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
            stats: RwLock::new(Stats::default()),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Claim the gate, or `None` if a cycle is already running
    pub fn try_begin(self: &Arc<Self>) -> Option<CycleGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;

        Some(CycleGuard {
            controller: Arc::clone(self),
            started: Instant::now(),
            finished: false,
        })
    }

    pub fn record_skipped(&self) {
        self.stats.write().cycles_skipped += 1;
    }

    pub fn status(&self) -> CycleStatus {
        let stats = self.stats.read();
        CycleStatus {
            busy: self.is_busy(),
            cycles_completed: stats.cycles_completed,
            cycles_failed: stats.cycles_failed,
            cycles_skipped: stats.cycles_skipped,
            last_completed_at: stats.last_completed_at,
            last_duration_ms: stats.last_duration_ms,
            last_error: stats.last_error.clone(),
        }
    }

    fn record(&self, duration_ms: u64, error: Option<String>) {
        let mut stats = self.stats.write();
        stats.last_duration_ms = Some(duration_ms);
        match error {
            None => {
                stats.cycles_completed += 1;
                stats.last_completed_at = Some(Utc::now());
                stats.last_error = None;
            }
            Some(e) => {
                stats.cycles_failed += 1;
                stats.last_error = Some(e);
            }
        }
    }
}

impl Default for CycleController {
    fn default() -> Self {
        Self::new()
    }
}

/// Held for the duration of one cycle; releases the gate on drop
pub struct CycleGuard {
    controller: Arc<CycleController>,
    started: Instant,
    finished: bool,
}

impl CycleGuard {
    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Record the cycle outcome and release the gate
    pub fn finish<T, E: std::fmt::Display>(mut self, result: &Result<T, E>) {
        let error = result.as_ref().err().map(|e| e.to_string());
        self.controller.record(self.elapsed_ms(), error);
        self.finished = true;
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.controller
                .record(self.elapsed_ms(), Some("cycle aborted".to_string()));
        }
        self.controller.busy.store(false, Ordering::SeqCst);
    }
}
