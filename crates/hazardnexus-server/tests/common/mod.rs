#![allow(dead_code)]

use async_trait::async_trait;
use hazardnexus_classifiers::{ClassifierConfig, RiskClassifier};
use hazardnexus_collectors::{CollectorSet, FetchParams, SourceCollector};
use hazardnexus_core::{Error, Payload, Result, SourceRecord, SourceType};
use hazardnexus_server::config::{City, ServiceConfig};
use hazardnexus_server::AppState;
use hazardnexus_store::SnapshotStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub fn test_config(dir: &TempDir) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    let assets = dir.path().join("assets");
    config.storage.image_dir = assets.join("images");
    config.storage.store_path = assets.join("data_store.json");
    config.storage.scratch_dir = dir.path().join("scratch");
    config.storage.asset_root = assets;
    config.collection.cities = vec![City::new("Delhi", 28.61, 77.20)];
    config.classifier = ClassifierConfig {
        samples: 300,
        trees: 10,
        ..Default::default()
    };
    config
}

pub fn state_with(config: ServiceConfig, collectors: CollectorSet) -> AppState {
    let store = SnapshotStore::new(config.storage.store()).unwrap();
    let classifier = RiskClassifier::train(&config.classifier).unwrap();
    AppState::from_parts(config, store, Arc::new(collectors), classifier, None)
}

pub fn state(dir: &TempDir, collectors: CollectorSet) -> AppState {
    state_with(test_config(dir), collectors)
}

/// Document source whose outcome can be flipped between cycles
pub struct SwitchableSource {
    pub id: &'static str,
    pub failing: AtomicBool,
    pub blank: AtomicBool,
}

impl SwitchableSource {
    pub fn new(id: &'static str) -> Arc<Self> {
        Arc::new(Self {
            id,
            failing: AtomicBool::new(false),
            blank: AtomicBool::new(false),
        })
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Succeed without producing any pages
    pub fn render_nothing(&self) {
        self.blank.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SourceCollector for SwitchableSource {
    fn source_id(&self) -> &str {
        self.id
    }

    fn source_type(&self) -> SourceType {
        SourceType::WeatherBulletin
    }

    async fn fetch(&self, _params: &FetchParams) -> Result<SourceRecord> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::parse("no bulletin link"));
        }
        if self.blank.load(Ordering::SeqCst) {
            return Ok(SourceRecord::new(
                self.id,
                SourceType::WeatherBulletin,
                Payload::ImagePaths(Vec::new()),
            ));
        }
        Ok(SourceRecord::new(
            self.id,
            SourceType::WeatherBulletin,
            Payload::ImagePaths(vec!["/assets/images/bulletin_page_1_1.png".to_string()]),
        ))
    }
}

pub const FEED_BODY: &str = r#"{"features": [
    {"geometry": {"coordinates": [77.2, 28.6]},
     "properties": {"eventtype": "FL", "name": "Flood in Delhi", "alertlevel": "Red"}},
    {"geometry": {"coordinates": [2.35, 48.85]},
     "properties": {"eventtype": "FL", "name": "Flood in Paris", "alertlevel": "Orange"}}
]}"#;

pub const FORECAST_BODY: &str = r#"{"current": {
    "time": "2024-07-01T10:00",
    "temperature_2m": 31.4,
    "relative_humidity_2m": 62,
    "precipitation": 12.5,
    "wind_speed_10m": 18.0,
    "soil_moisture_0_to_1cm": 0.31
}}"#;
