//! Current conditions at a point (Open-Meteo)

use crate::collector::{check_status, http_client, http_error, FetchParams, SourceCollector};
use async_trait::async_trait;
use hazardnexus_core::{
    Error, Payload, Result, RiskLevel, SourceRecord, SourceType, WeatherSnapshot,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const FORECAST_TIMEOUT: Duration = Duration::from_secs(10);

const CURRENT_VARIABLES: &str = "temperature_2m,relative_humidity_2m,precipitation,rain,wind_speed_10m,wind_direction_10m,soil_moisture_0_to_1cm";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    time: Option<String>,
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    precipitation: Option<f64>,
    wind_speed_10m: Option<f64>,
    soil_moisture_0_to_1cm: Option<f64>,
}

/// Map a forecast body to a snapshot for the requested point
pub fn parse_conditions(body: &str, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
    let response: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| Error::parse(format!("malformed forecast response: {e}")))?;
    let current = response
        .current
        .ok_or_else(|| Error::parse("forecast response has no current block"))?;

    let precip_mm = current
        .precipitation
        .ok_or_else(|| Error::parse("forecast missing precipitation"))?;
    let wind_kph = current
        .wind_speed_10m
        .ok_or_else(|| Error::parse("forecast missing wind speed"))?;

    Ok(WeatherSnapshot {
        lat,
        lon,
        temp_c: current.temperature_2m,
        humidity: current.relative_humidity_2m,
        precip_mm,
        wind_kph,
        soil_moisture: current.soil_moisture_0_to_1cm,
        observed_at: current.time,
        risk_level: RiskLevel::from_conditions(wind_kph, precip_mm),
    })
}

/// Point forecast for one coordinate
pub struct ForecastCollector {
    client: reqwest::Client,
    url: String,
}

impl ForecastCollector {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client(FORECAST_TIMEOUT, false)?,
            url: url.into(),
        })
    }

    pub async fn fetch_conditions(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current", CURRENT_VARIABLES.to_string()),
                ("hourly", "visibility".to_string()),
                ("forecast_days", "1".to_string()),
            ])
            .send()
            .await
            .map_err(http_error)?;
        let body = check_status(response)?.text().await.map_err(http_error)?;

        let snapshot = parse_conditions(&body, lat, lon)?;
        debug!(
            "Forecast ({}, {}): wind {} km/h, precip {} mm, risk {}",
            lat, lon, snapshot.wind_kph, snapshot.precip_mm, snapshot.risk_level
        );
        Ok(snapshot)
    }

    /// Conditions, or `None` (unknown) on any failure
    pub async fn fetch_weather(&self, lat: f64, lon: f64) -> Option<WeatherSnapshot> {
        match self.fetch_conditions(lat, lon).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Forecast for ({}, {}) unavailable: {}", lat, lon, e);
                None
            }
        }
    }
}

#[async_trait]
impl SourceCollector for ForecastCollector {
    fn source_id(&self) -> &str {
        "open_meteo"
    }

    fn source_type(&self) -> SourceType {
        SourceType::PointForecast
    }

    async fn fetch(&self, params: &FetchParams) -> Result<SourceRecord> {
        let point = params.require_location(self.source_id())?;
        let snapshot = self.fetch_conditions(point.lat, point.lon).await?;
        Ok(SourceRecord::new(
            self.source_id(),
            self.source_type(),
            Payload::Weather(snapshot),
        ))
    }
}
