//! Core types for HazardNexus
//!
//! Everything here is serialized with camelCase field names, which is the
//! shape the dashboard reads from the persisted snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Inclusive latitude/longitude rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Operational region for the multi-hazard feed
    pub const INDIA: BoundingBox = BoundingBox {
        lat_min: 6.0,
        lat_max: 37.0,
        lon_min: 68.0,
        lon_max: 98.0,
    };

    /// Inclusive at all four edges
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.lat_min <= lat && lat <= self.lat_max && self.lon_min <= lon && lon <= self.lon_max
    }
}

/// Alert level reported by the multi-hazard feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Green,
    Orange,
    Red,
}

impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(Self::Green),
            "orange" => Ok(Self::Orange),
            "red" => Ok(Self::Red),
            other => Err(Error::parse(format!("unknown alert level: {other}"))),
        }
    }
}

/// One geotagged hazard alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardEvent {
    /// Feed event code (EQ, TC, FL, DR)
    pub event_type: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub lat: f64,
    pub lon: f64,
    pub observed_at: Option<String>,
    pub source_country_code: Option<String>,
    pub episode_id: Option<String>,
}

/// Kind of emergency facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiCategory {
    Hospital,
    Police,
    FireStation,
    Unknown,
}

impl PoiCategory {
    /// Map an OpenStreetMap `amenity` tag value
    pub fn from_amenity(amenity: Option<&str>) -> Self {
        match amenity {
            Some("hospital") => Self::Hospital,
            Some("police") => Self::Police,
            Some("fire_station") => Self::FireStation,
            _ => Self::Unknown,
        }
    }

    /// The `amenity` tag value queried for this category
    pub fn amenity(&self) -> Option<&'static str> {
        match self {
            Self::Hospital => Some("hospital"),
            Self::Police => Some("police"),
            Self::FireStation => Some("fire_station"),
            Self::Unknown => None,
        }
    }
}

/// One emergency-service facility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructurePoi {
    pub category: PoiCategory,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub tags: BTreeMap<String, String>,
}

/// Coarse weather risk derived from wind and precipitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Thresholds are strict: 50 km/h of wind is Medium, not High.
    pub fn from_conditions(wind_kph: f64, precip_mm: f64) -> Self {
        if wind_kph > 50.0 || precip_mm > 50.0 {
            Self::High
        } else if wind_kph > 30.0 || precip_mm > 20.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

/// Current conditions at one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub lat: f64,
    pub lon: f64,
    pub temp_c: Option<f64>,
    pub humidity: Option<f64>,
    pub precip_mm: f64,
    pub wind_kph: f64,
    pub soil_moisture: Option<f64>,
    pub observed_at: Option<String>,
    pub risk_level: RiskLevel,
}

/// Which kind of signal a source provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    MultiHazardAlerts,
    Infrastructure,
    PointForecast,
    WeatherBulletin,
    FloodReport,
    SatelliteImagery,
    AirQuality,
}

/// Exactly one kind of data per record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    ImagePaths(Vec<String>),
    HazardEvents(Vec<HazardEvent>),
    Infrastructure(Vec<InfrastructurePoi>),
    Weather(WeatherSnapshot),
    /// Total failure of the source for this attempt
    Error(String),
}

/// Output of one collector call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRecord {
    pub source_id: String,
    pub source_type: SourceType,
    pub fetched_at: DateTime<Utc>,
    pub payload: Payload,

    /// Document or image URL the payload was derived from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl SourceRecord {
    pub fn new(source_id: impl Into<String>, source_type: SourceType, payload: Payload) -> Self {
        Self {
            source_id: source_id.into(),
            source_type,
            fetched_at: Utc::now(),
            payload,
            origin_url: None,
            note: None,
        }
    }

    /// Record describing a total failure of the source
    pub fn failed(source_id: impl Into<String>, source_type: SourceType, error: &Error) -> Self {
        Self::new(source_id, source_type, Payload::Error(error.to_string()))
    }

    pub fn with_origin_url(mut self, url: impl Into<String>) -> Self {
        self.origin_url = Some(url.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, Payload::Error(_))
    }

    /// An error record, or an image record with neither pages nor a note
    pub fn is_failed(&self) -> bool {
        match &self.payload {
            Payload::Error(_) => true,
            Payload::ImagePaths(paths) => paths.is_empty() && self.note.is_none(),
            _ => false,
        }
    }

    pub fn image_paths(&self) -> Option<&[String]> {
        match &self.payload {
            Payload::ImagePaths(paths) => Some(paths),
            _ => None,
        }
    }
}

/// The single persisted aggregation document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub alerts: Vec<HazardEvent>,

    #[serde(default)]
    pub key_metrics: BTreeMap<String, WeatherSnapshot>,

    /// Epoch seconds; 0 means never collected
    #[serde(default)]
    pub last_updated: i64,

    /// Document/image sources, only present when bulletin collection runs
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub bulletins: BTreeMap<String, SourceRecord>,
}

impl Snapshot {
    /// The well-defined snapshot returned before anything was collected
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.last_updated == 0 && self.alerts.is_empty() && self.key_metrics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_is_inclusive_at_edges() {
        let region = BoundingBox::INDIA;
        assert!(region.contains(6.0, 68.0));
        assert!(region.contains(37.0, 98.0));
        assert!(region.contains(6.0, 98.0));
        assert!(region.contains(37.0, 68.0));
        assert!(!region.contains(5.99, 80.0));
        assert!(!region.contains(37.01, 80.0));
        assert!(!region.contains(20.0, 67.99));
        assert!(!region.contains(20.0, 98.01));
    }

    #[test]
    fn risk_thresholds_are_strict() {
        assert_eq!(RiskLevel::from_conditions(50.0, 0.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_conditions(51.0, 0.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_conditions(31.0, 0.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_conditions(30.0, 0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_conditions(10.0, 10.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_conditions(0.0, 50.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_conditions(0.0, 50.5), RiskLevel::High);
        assert_eq!(RiskLevel::from_conditions(0.0, 20.5), RiskLevel::Medium);
    }

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("Orange".parse::<Severity>().unwrap(), Severity::Orange);
        assert_eq!("RED".parse::<Severity>().unwrap(), Severity::Red);
        assert!("purple".parse::<Severity>().is_err());
    }

    #[test]
    fn poi_category_from_amenity() {
        assert_eq!(PoiCategory::from_amenity(Some("hospital")), PoiCategory::Hospital);
        assert_eq!(
            PoiCategory::from_amenity(Some("fire_station")),
            PoiCategory::FireStation
        );
        assert_eq!(PoiCategory::from_amenity(Some("school")), PoiCategory::Unknown);
        assert_eq!(PoiCategory::from_amenity(None), PoiCategory::Unknown);
    }

    #[test]
    fn empty_snapshot_serializes_to_three_keys() {
        let json = serde_json::to_value(Snapshot::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"alerts": [], "keyMetrics": {}, "lastUpdated": 0})
        );
    }

    #[test]
    fn payload_is_keyed_by_variant() {
        let record = SourceRecord::new(
            "imd",
            SourceType::WeatherBulletin,
            Payload::ImagePaths(vec!["/assets/images/a.png".to_string()]),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["payload"]["imagePaths"][0], "/assets/images/a.png");
        assert_eq!(json["sourceType"], "weather_bulletin");
        assert!(json.get("originUrl").is_none());

        let failed = SourceRecord::failed("cwc", SourceType::FloodReport, &Error::Timeout);
        assert!(failed.is_error());
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["payload"]["error"], "operation timed out");
    }

    #[test]
    fn empty_image_record_without_note_counts_as_failed() {
        let blank = SourceRecord::new("imd", SourceType::WeatherBulletin, Payload::ImagePaths(vec![]));
        assert!(blank.is_failed());
        assert!(!blank.is_error());

        let degraded = blank.clone().with_note("conversion unavailable");
        assert!(!degraded.is_failed());

        let events = SourceRecord::new("gdacs", SourceType::MultiHazardAlerts, Payload::HazardEvents(vec![]));
        assert!(!events.is_failed());
    }
}
