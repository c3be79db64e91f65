//! Multi-hazard alert feed (GDACS event list)

use crate::collector::{get_text, http_client, FetchParams, SourceCollector};
use async_trait::async_trait;
use hazardnexus_core::{
    BoundingBox, Error, HazardEvent, Payload, Result, Severity, SourceRecord, SourceType,
};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

pub const FEED_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    features: Vec<FeedFeature>,
}

#[derive(Debug, Deserialize)]
struct FeedFeature {
    #[serde(default)]
    properties: FeedProperties,
    #[serde(default)]
    geometry: Option<FeedGeometry>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedProperties {
    eventtype: Option<String>,
    name: Option<String>,
    description: Option<String>,
    alertlevel: Option<String>,
    fromdate: Option<String>,
    iso3: Option<String>,
    country: Option<String>,
    episodeid: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FeedGeometry {
    #[serde(default)]
    coordinates: Value,
}

impl FeedGeometry {
    /// Point coordinates are `[lon, lat]`
    fn lat_lon(&self) -> Option<(f64, f64)> {
        let coords = self.coordinates.as_array()?;
        let lon = coords.first()?.as_f64()?;
        let lat = coords.get(1)?.as_f64()?;
        Some((lat, lon))
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Turn the raw feed body into events inside `region`
pub fn parse_events(body: &str, region: &BoundingBox) -> Result<Vec<HazardEvent>> {
    let document: FeedDocument = serde_json::from_str(body)
        .map_err(|e| Error::parse(format!("malformed event feed: {e}")))?;

    let events = document
        .features
        .into_iter()
        .filter_map(|feature| {
            let (lat, lon) = feature.geometry.as_ref()?.lat_lon()?;
            if !region.contains(lat, lon) {
                return None;
            }

            let props = feature.properties;
            let severity = props.alertlevel.as_deref()?.parse::<Severity>().ok()?;

            Some(HazardEvent {
                event_type: props.eventtype.unwrap_or_default(),
                name: props.name.unwrap_or_default(),
                description: props.description.unwrap_or_default(),
                severity,
                lat,
                lon,
                observed_at: props.fromdate,
                source_country_code: props.iso3.or(props.country),
                episode_id: props.episodeid.as_ref().and_then(value_to_string),
            })
        })
        .collect();

    Ok(events)
}

/// Geotagged disaster alerts filtered to the operational region
pub struct FeedCollector {
    client: reqwest::Client,
    url: String,
    region: BoundingBox,
}

impl FeedCollector {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(FEED_TIMEOUT, false)?,
            url: url.into(),
            region: BoundingBox::INDIA,
        })
    }

    pub fn with_region(mut self, region: BoundingBox) -> Self {
        self.region = region;
        self
    }

    pub async fn fetch_events(&self) -> Result<Vec<HazardEvent>> {
        let body = get_text(&self.client, &self.url).await?;
        let events = parse_events(&body, &self.region)?;
        info!("Event feed: {} events in region", events.len());
        Ok(events)
    }

    /// Events, or an empty list on any failure
    pub async fn fetch_alerts(&self) -> Vec<HazardEvent> {
        match self.fetch_events().await {
            Ok(events) => events,
            Err(e) => {
                warn!("Event feed unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl SourceCollector for FeedCollector {
    fn source_id(&self) -> &str {
        "gdacs"
    }

    fn source_type(&self) -> SourceType {
        SourceType::MultiHazardAlerts
    }

    /// Upstream failures yield an empty event list, not an error record
    async fn fetch(&self, _params: &FetchParams) -> Result<SourceRecord> {
        let events = self.fetch_alerts().await;
        Ok(SourceRecord::new(
            self.source_id(),
            self.source_type(),
            Payload::HazardEvents(events),
        ))
    }
}
