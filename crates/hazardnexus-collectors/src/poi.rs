//! Emergency infrastructure near a point (Overpass)

use crate::collector::{
    check_status, http_client, http_error, FetchParams, SourceCollector, DEFAULT_RADIUS_M,
};
use async_trait::async_trait;
use hazardnexus_core::{
    Error, InfrastructurePoi, Payload, PoiCategory, Result, SourceRecord, SourceType,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn};

pub const POI_TIMEOUT: Duration = Duration::from_secs(25);

const UNKNOWN_NAME: &str = "Unknown Facility";

const AMENITIES: [PoiCategory; 3] = [
    PoiCategory::Hospital,
    PoiCategory::Police,
    PoiCategory::FireStation,
];

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// Overpass QL radius query for the emergency amenities
pub fn build_query(lat: f64, lon: f64, radius_m: u32) -> String {
    let mut query = String::from("[out:json];\n(\n");
    for category in AMENITIES {
        if let Some(amenity) = category.amenity() {
            query.push_str(&format!(
                "  node[\"amenity\"=\"{amenity}\"](around:{radius_m},{lat},{lon});\n"
            ));
        }
    }
    query.push_str(");\nout body;\n>;\nout skel qt;\n");
    query
}

/// Map Overpass elements; elements without coordinates are dropped
pub fn parse_elements(body: &str) -> Result<Vec<InfrastructurePoi>> {
    let response: OverpassResponse = serde_json::from_str(body)
        .map_err(|e| Error::parse(format!("malformed Overpass response: {e}")))?;

    Ok(response
        .elements
        .into_iter()
        .filter_map(|el| {
            let (lat, lon) = (el.lat?, el.lon?);
            let category = PoiCategory::from_amenity(el.tags.get("amenity").map(String::as_str));
            let name = el
                .tags
                .get("name")
                .cloned()
                .unwrap_or_else(|| UNKNOWN_NAME.to_string());
            Some(InfrastructurePoi {
                category,
                name,
                lat,
                lon,
                tags: el.tags,
            })
        })
        .collect())
}

/// Hospitals, police and fire stations around a coordinate
pub struct PoiCollector {
    client: reqwest::Client,
    url: String,
}

impl PoiCollector {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(POI_TIMEOUT, false)?,
            url: url.into(),
        })
    }

    pub async fn fetch_points(
        &self,
        lat: f64,
        lon: f64,
        radius_m: u32,
    ) -> Result<Vec<InfrastructurePoi>> {
        let query = build_query(lat, lon, radius_m);
        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(http_error)?;
        let body = check_status(response)?.text().await.map_err(http_error)?;

        let points = parse_elements(&body)?;
        info!("Overpass: {} facilities near ({}, {})", points.len(), lat, lon);
        Ok(points)
    }

    /// Facilities, or an empty list on any failure
    pub async fn fetch_infrastructure(
        &self,
        lat: f64,
        lon: f64,
        radius_m: u32,
    ) -> Vec<InfrastructurePoi> {
        match self.fetch_points(lat, lon, radius_m).await {
            Ok(points) => points,
            Err(e) => {
                warn!("Overpass query failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SourceCollector for PoiCollector {
    fn source_id(&self) -> &str {
        "osm"
    }

    fn source_type(&self) -> SourceType {
        SourceType::Infrastructure
    }

    async fn fetch(&self, params: &FetchParams) -> Result<SourceRecord> {
        let point = params.require_location(self.source_id())?;
        let radius = params.radius_m.unwrap_or(DEFAULT_RADIUS_M);
        let points = self.fetch_infrastructure(point.lat, point.lon, radius).await;
        Ok(SourceRecord::new(
            self.source_id(),
            self.source_type(),
            Payload::Infrastructure(points),
        ))
    }
}
