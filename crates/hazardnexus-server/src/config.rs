//! Service configuration

use hazardnexus_classifiers::ClassifierConfig;
use hazardnexus_collectors::{SourcesConfig, StorageLayout};
use hazardnexus_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub collection: CollectionConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub listen: Option<String>,
    pub port: Option<u16>,
    pub interval_minutes: Option<u64>,
    pub collect_bulletins: bool,
    pub skip_initial_run: bool,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Some(listen) = &overrides.listen {
            config.server.listen = listen.clone();
        }
        if let Some(port) = overrides.port {
            config.server.port = port;
        }
        if let Some(minutes) = overrides.interval_minutes {
            config.collection.interval_minutes = minutes;
        }
        if overrides.collect_bulletins {
            config.collection.collect_bulletins = true;
        }
        if overrides.skip_initial_run {
            config.collection.run_on_start = false;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.collection.interval_minutes == 0 {
            anyhow::bail!("collection.interval_minutes must be at least 1");
        }
        if self.collection.interval_minutes > MAX_INTERVAL_MINUTES {
            anyhow::bail!(
                "collection.interval_minutes must be at most {} (one week)",
                MAX_INTERVAL_MINUTES
            );
        }
        if self.classifier.samples == 0 || self.classifier.trees == 0 {
            anyhow::bail!("classifier needs at least one sample and one tree");
        }
        Ok(())
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

/// Filesystem layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory served under `/assets`
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,

    /// Rendered and mirrored images
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Transient downloaded documents
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,

    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// URL prefix for `image_dir`
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            asset_root: default_asset_root(),
            image_dir: default_image_dir(),
            scratch_dir: default_scratch_dir(),
            store_path: default_store_path(),
            public_prefix: default_public_prefix(),
        }
    }
}

impl StorageConfig {
    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(&self.image_dir, &self.scratch_dir, &self.public_prefix)
    }

    pub fn store(&self) -> StoreConfig {
        StoreConfig {
            path: self.store_path.clone(),
            ..Default::default()
        }
    }
}

/// A reference city sampled every cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    pub fn new(name: &str, lat: f64, lon: f64) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
        }
    }
}

/// Longest accepted cycle interval
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Collection cycle configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Run one cycle as soon as the service starts
    #[serde(default = "default_true")]
    pub run_on_start: bool,

    /// Include the document and image sources in scheduled cycles
    #[serde(default)]
    pub collect_bulletins: bool,

    #[serde(default = "default_cities")]
    pub cities: Vec<City>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            run_on_start: true,
            collect_bulletins: false,
            cities: default_cities(),
        }
    }
}

impl CollectionConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("./assets")
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("./assets/images")
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("./temp_pdfs")
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./assets/data_store.json")
}

fn default_public_prefix() -> String {
    "/assets/images".to_string()
}

fn default_interval_minutes() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

fn default_cities() -> Vec<City> {
    vec![
        City::new("Delhi", 28.61, 77.20),
        City::new("Mumbai", 19.07, 72.87),
        City::new("Chennai", 13.08, 80.27),
        City::new("Kolkata", 22.57, 88.36),
        City::new("Guwahati", 26.11, 91.70),
    ]
}
