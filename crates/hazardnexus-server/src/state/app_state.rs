use crate::config::ServiceConfig;
use crate::cycle::Orchestrator;
use hazardnexus_classifiers::RiskClassifier;
use hazardnexus_collectors::{CollectorSet, RenderCapability, RenderPipeline};
use hazardnexus_store::SnapshotStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,

    /// Read side of the snapshot store; the orchestrator is the only writer
    pub store: SnapshotStore,

    pub collectors: Arc<CollectorSet>,

    pub classifier: RiskClassifier,

    pub orchestrator: Arc<Orchestrator>,

    /// Document rasterization availability, as reported on the status page
    pub rendering: String,

    /// Prometheus renderer, when the exporter is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build everything from configuration: storage roots, render capability,
    /// collectors, and the trained classifier
    pub async fn initialize(
        config: ServiceConfig,
        metrics: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        let capability = RenderCapability::detect().await;
        let rendering = capability.describe();
        let pipeline = Arc::new(RenderPipeline::new(
            config.storage.layout(),
            capability,
            config.sources.accept_invalid_certs,
        )?);

        let store = SnapshotStore::new(config.storage.store())?;
        let collectors = Arc::new(CollectorSet::build(&config.sources, pipeline));

        let classifier_config = config.classifier.clone();
        let classifier =
            tokio::task::spawn_blocking(move || RiskClassifier::train(&classifier_config))
                .await??;

        info!("Application state initialized");
        Ok(Self::from_parts(config, store, collectors, classifier, metrics).with_rendering(rendering))
    }

    /// Assemble state from already built components
    pub fn from_parts(
        config: ServiceConfig,
        store: SnapshotStore,
        collectors: Arc<CollectorSet>,
        classifier: RiskClassifier,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        let orchestrator = Arc::new(Orchestrator::new(
            collectors.clone(),
            store.clone(),
            config.collection.cities.clone(),
            config.collection.collect_bulletins,
        ));

        Self {
            config: Arc::new(config),
            store,
            collectors,
            classifier,
            orchestrator,
            rendering: "not probed".to_string(),
            metrics,
        }
    }

    pub fn with_rendering(mut self, description: impl Into<String>) -> Self {
        self.rendering = description.into();
        self
    }
}
