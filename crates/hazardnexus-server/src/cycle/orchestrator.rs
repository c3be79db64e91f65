//! Collection cycles
//!
//! One cycle reads every configured source sequentially, merges the results
//! over the previous snapshot and saves it. A source that fails keeps its
//! previous value; `lastUpdated` always advances.

use crate::config::City;
use crate::cycle::{CycleController, CycleGuard};
use chrono::Utc;
use hazardnexus_collectors::{CollectorSet, FetchParams};
use hazardnexus_core::{Error, Result, Snapshot};
use hazardnexus_store::SnapshotStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

pub const CYCLES_TOTAL: &str = "hazardnexus_cycles_total";
pub const SOURCE_FAILURES_TOTAL: &str = "hazardnexus_source_failures_total";
pub const CYCLE_DURATION_MS: &str = "hazardnexus_cycle_duration_ms";

/// Result of an on-demand trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOutcome {
    Triggered,
    AlreadyRunning,
}

impl TriggerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::AlreadyRunning => "already_running",
        }
    }
}

fn source_failed(source: &str, err: &Error) {
    warn!("{} failed this cycle, keeping previous data: {}", source, err);
    metrics::counter!(SOURCE_FAILURES_TOTAL, "source" => source.to_string()).increment(1);
}

/// Owns snapshot assembly and is the only writer of the store
pub struct Orchestrator {
    collectors: Arc<CollectorSet>,
    store: SnapshotStore,
    controller: Arc<CycleController>,
    cities: Vec<City>,
    collect_bulletins: bool,
}

impl Orchestrator {
    pub fn new(
        collectors: Arc<CollectorSet>,
        store: SnapshotStore,
        cities: Vec<City>,
        collect_bulletins: bool,
    ) -> Self {
        Self {
            collectors,
            store,
            controller: Arc::new(CycleController::new()),
            cities,
            collect_bulletins,
        }
    }

    pub fn controller(&self) -> &Arc<CycleController> {
        &self.controller
    }

    pub fn collects_bulletins(&self) -> bool {
        self.collect_bulletins
    }

    /// Start a cycle in the background; returns immediately
    pub fn trigger(self: &Arc<Self>) -> TriggerOutcome {
        let Some(guard) = self.controller.try_begin() else {
            self.skip();
            return TriggerOutcome::AlreadyRunning;
        };

        let this = Arc::clone(self);
        tokio::spawn(async move {
            let _ = this.run_guarded(guard).await;
        });
        TriggerOutcome::Triggered
    }

    /// Run a cycle to completion, or `None` if one is already running
    pub async fn run_once(&self) -> Result<Option<Snapshot>> {
        let Some(guard) = self.controller.try_begin() else {
            self.skip();
            return Ok(None);
        };
        self.run_guarded(guard).await.map(Some)
    }

    fn skip(&self) {
        info!("Collection already running, trigger dropped");
        self.controller.record_skipped();
        metrics::counter!(CYCLES_TOTAL, "outcome" => "skipped").increment(1);
    }

    async fn run_guarded(&self, guard: CycleGuard) -> Result<Snapshot> {
        let start = Instant::now();
        let result = self.run_cycle().await;
        let elapsed_ms = start.elapsed().as_millis() as f64;

        metrics::histogram!(CYCLE_DURATION_MS).record(elapsed_ms);
        match &result {
            Ok(snapshot) => {
                metrics::counter!(CYCLES_TOTAL, "outcome" => "success").increment(1);
                info!(
                    "Collection complete: {} alerts, {} cities, {} bulletins in {:.0}ms",
                    snapshot.alerts.len(),
                    snapshot.key_metrics.len(),
                    snapshot.bulletins.len(),
                    elapsed_ms
                );
            }
            Err(e) => {
                metrics::counter!(CYCLES_TOTAL, "outcome" => "error").increment(1);
                error!("Collection cycle failed: {}", e);
            }
        }

        guard.finish(&result);
        result
    }

    async fn load_prior(&self) -> Snapshot {
        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.load()).await {
            Ok(Ok(snapshot)) => snapshot,
            Ok(Err(e)) => {
                warn!("Previous snapshot unreadable, starting empty: {}", e);
                Snapshot::empty()
            }
            Err(e) => {
                warn!("Snapshot load task failed, starting empty: {}", e);
                Snapshot::empty()
            }
        }
    }

    async fn run_cycle(&self) -> Result<Snapshot> {
        info!("Starting collection cycle");
        let mut snapshot = self.load_prior().await;

        if let Some(feed) = &self.collectors.feed {
            match feed.fetch_events().await {
                Ok(events) => snapshot.alerts = events,
                Err(e) => source_failed("gdacs", &e),
            }
        }

        if let Some(forecast) = &self.collectors.forecast {
            for city in &self.cities {
                match forecast.fetch_conditions(city.lat, city.lon).await {
                    Ok(weather) => {
                        snapshot.key_metrics.insert(city.name.clone(), weather);
                    }
                    Err(e) => source_failed(&format!("open_meteo:{}", city.name), &e),
                }
            }
        }

        if self.collect_bulletins {
            for collector in &self.collectors.documents {
                let record = collector.collect(&FetchParams::none()).await;
                let id = record.source_id.clone();
                if record.is_failed() {
                    warn!("{} produced no usable record this cycle", id);
                    metrics::counter!(SOURCE_FAILURES_TOTAL, "source" => id.clone()).increment(1);
                    if snapshot.bulletins.contains_key(&id) {
                        continue;
                    }
                }
                snapshot.bulletins.insert(id, record);
            }
        }

        snapshot.last_updated = Utc::now().timestamp();

        let store = self.store.clone();
        let to_save = snapshot.clone();
        tokio::task::spawn_blocking(move || store.save(&to_save))
            .await
            .map_err(|e| Error::internal(format!("snapshot save task failed: {e}")))??;

        Ok(snapshot)
    }
}
