//! Construction of the full collector set

use crate::bulletin::BulletinCollector;
use crate::collector::SourceCollector;
use crate::config::SourcesConfig;
use crate::feed::FeedCollector;
use crate::flood_report::FloodReportCollector;
use crate::forecast::ForecastCollector;
use crate::mirror::MirrorCollector;
use crate::poi::PoiCollector;
use crate::render::RenderPipeline;
use crate::stub::AirQualityStub;
use hazardnexus_core::Result;
use std::sync::Arc;
use tracing::{error, info};

/// Every collector the service runs
///
/// A collector that fails to build is logged and left out; the rest are
/// still available.
#[derive(Default)]
pub struct CollectorSet {
    pub feed: Option<Arc<FeedCollector>>,
    pub poi: Option<Arc<PoiCollector>>,
    pub forecast: Option<Arc<ForecastCollector>>,

    /// Satellite, weather bulletin, flood report and air quality sources
    pub documents: Vec<Arc<dyn SourceCollector>>,
}

fn isolated<T>(name: &str, build: impl FnOnce() -> Result<T>) -> Option<T> {
    match build() {
        Ok(collector) => Some(collector),
        Err(e) => {
            error!("Failed to initialize {} collector: {}", name, e);
            None
        }
    }
}

impl CollectorSet {
    pub fn build(config: &SourcesConfig, pipeline: Arc<RenderPipeline>) -> Self {
        let insecure = config.accept_invalid_certs;

        let feed = isolated("feed", || FeedCollector::new(&config.feed_url)).map(Arc::new);
        let poi = isolated("poi", || PoiCollector::new(&config.overpass_url)).map(Arc::new);
        let forecast =
            isolated("forecast", || ForecastCollector::new(&config.forecast_url)).map(Arc::new);

        let mut documents: Vec<Arc<dyn SourceCollector>> = Vec::new();
        if let Some(c) = isolated("satellite", || {
            MirrorCollector::new(
                &config.satellite_image_url,
                pipeline.layout().clone(),
                insecure,
            )
        }) {
            documents.push(Arc::new(c));
        }
        if let Some(c) = isolated("bulletin", || {
            BulletinCollector::new(
                &config.bulletin_page_url,
                &config.bulletin_base_url,
                pipeline.clone(),
                insecure,
            )
        }) {
            documents.push(Arc::new(c));
        }
        if let Some(c) = isolated("flood report", || {
            FloodReportCollector::new(&config.flood_report_base_url, pipeline.clone(), insecure)
        }) {
            documents.push(Arc::new(c));
        }
        documents.push(Arc::new(AirQualityStub::new(&config.air_quality_image_url)));

        let set = Self {
            feed,
            poi,
            forecast,
            documents,
        };
        info!("Initialized {} collectors", set.len());
        set
    }

    pub fn len(&self) -> usize {
        usize::from(self.feed.is_some())
            + usize::from(self.poi.is_some())
            + usize::from(self.forecast.is_some())
            + self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn source_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        if let Some(c) = &self.feed {
            ids.push(c.source_id().to_string());
        }
        if let Some(c) = &self.poi {
            ids.push(c.source_id().to_string());
        }
        if let Some(c) = &self.forecast {
            ids.push(c.source_id().to_string());
        }
        ids.extend(self.documents.iter().map(|c| c.source_id().to_string()));
        ids
    }
}

impl std::fmt::Debug for CollectorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorSet")
            .field("sources", &self.source_ids())
            .finish()
    }
}
