//! HazardNexus Collectors
//!
//! Fetches hazard signals from heterogeneous public sources.
//!
//! Every collector implements [`SourceCollector`]: failures come back as
//! [`hazardnexus_core::Error`] values and never escape as panics. Two of them
//! (the weather bulletin and the flood report) hand documents to the
//! [`RenderPipeline`], which rasterizes them into public page images when a
//! backend is available on the host.

pub mod bulletin;
pub mod collector;
pub mod config;
pub mod feed;
pub mod flood_report;
pub mod forecast;
pub mod html;
pub mod mirror;
pub mod poi;
pub mod render;
pub mod set;
pub mod stub;

pub use bulletin::BulletinCollector;
pub use collector::{http_client, FetchParams, SourceCollector, DEFAULT_RADIUS_M};
pub use config::SourcesConfig;
pub use feed::FeedCollector;
pub use flood_report::{FloodReportCollector, ReportLocation};
pub use forecast::ForecastCollector;
pub use mirror::MirrorCollector;
pub use poi::PoiCollector;
pub use render::{PdftoppmRasterizer, Rasterizer, RenderCapability, RenderPipeline, StorageLayout};
pub use set::CollectorSet;
pub use stub::AirQualityStub;
