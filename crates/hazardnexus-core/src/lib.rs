//! HazardNexus Core
//!
//! Core types and error handling shared across HazardNexus components.
//!
//! This crate provides:
//! - The aggregation data model (hazard events, facilities, weather, snapshots)
//! - Per-source records with exactly one payload kind
//! - Error taxonomy and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    BoundingBox, GeoPoint, HazardEvent, InfrastructurePoi, Payload, PoiCategory, RiskLevel,
    Severity, Snapshot, SourceRecord, SourceType, WeatherSnapshot,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        GeoPoint, HazardEvent, InfrastructurePoi, Payload, Snapshot, SourceRecord, SourceType,
        WeatherSnapshot,
    };
}
