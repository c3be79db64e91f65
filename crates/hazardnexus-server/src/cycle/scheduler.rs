//! Periodic triggering of collection cycles

use crate::cycle::Orchestrator;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// Calls a callback on a fixed period until stopped
pub trait PeriodicTimer: Send + Sync {
    /// Returns false if the timer was already running
    fn start(&self, period: Duration, callback: TickCallback) -> bool;

    fn stop(&self);

    fn is_running(&self) -> bool;
}

/// [`PeriodicTimer`] on `tokio::time::interval`
///
/// The first tick fires one period after `start`, and missed ticks are
/// skipped rather than bunched up. Must be started inside a tokio runtime.
#[derive(Default)]
pub struct TokioIntervalTimer {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TokioIntervalTimer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PeriodicTimer for TokioIntervalTimer {
    fn start(&self, period: Duration, callback: TickCallback) -> bool {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }

        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;

            loop {
                interval.tick().await;
                debug!("Timer tick");
                callback();
            }
        }));
        true
    }

    fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for TokioIntervalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Trigger a cycle on every tick
pub fn schedule_collection(
    timer: &dyn PeriodicTimer,
    orchestrator: Arc<Orchestrator>,
    period: Duration,
) -> bool {
    info!("Scheduling collection every {:?}", period);
    timer.start(
        period,
        Arc::new(move || {
            orchestrator.trigger();
        }),
    )
}
