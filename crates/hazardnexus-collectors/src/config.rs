//! Upstream endpoints

use serde::{Deserialize, Serialize};

/// Where each collector fetches from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,

    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    #[serde(default = "default_bulletin_page_url")]
    pub bulletin_page_url: String,

    /// Base for relative links found on the bulletin page
    #[serde(default = "default_bulletin_base_url")]
    pub bulletin_base_url: String,

    /// Site root for the dated flood report pages
    #[serde(default = "default_flood_report_base_url")]
    pub flood_report_base_url: String,

    #[serde(default = "default_satellite_image_url")]
    pub satellite_image_url: String,

    #[serde(default = "default_air_quality_image_url")]
    pub air_quality_image_url: String,

    /// Skip TLS verification for the government document hosts
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            overpass_url: default_overpass_url(),
            forecast_url: default_forecast_url(),
            bulletin_page_url: default_bulletin_page_url(),
            bulletin_base_url: default_bulletin_base_url(),
            flood_report_base_url: default_flood_report_base_url(),
            satellite_image_url: default_satellite_image_url(),
            air_quality_image_url: default_air_quality_image_url(),
            accept_invalid_certs: false,
        }
    }
}

fn default_feed_url() -> String {
    "https://www.gdacs.org/gdacsapi/api/events/geteventlist/SEARCH?eventlist=EQ,TC,FL,DR&alertlevel=Green,Orange,Red".to_string()
}

fn default_overpass_url() -> String {
    "http://overpass-api.de/api/interpreter".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_bulletin_page_url() -> String {
    "https://mausam.imd.gov.in/responsive/all_india_forcast_bulletin.php".to_string()
}

fn default_bulletin_base_url() -> String {
    "https://mausam.imd.gov.in".to_string()
}

fn default_flood_report_base_url() -> String {
    "https://cwc.gov.in".to_string()
}

fn default_satellite_image_url() -> String {
    "https://mausam.imd.gov.in/Satellite/3Dasiasec_ir1.jpg".to_string()
}

fn default_air_quality_image_url() -> String {
    "http://safar.tropmet.res.in/Content/images/safar_logo.png".to_string()
}
