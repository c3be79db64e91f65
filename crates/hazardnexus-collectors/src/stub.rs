//! Air quality placeholder (SAFAR publishes no machine-readable bulletin)

use crate::collector::{FetchParams, SourceCollector};
use async_trait::async_trait;
use hazardnexus_core::{Payload, Result, SourceRecord, SourceType};

pub const AIR_QUALITY_NOTE: &str = "Live AQI data unavailable in PDF format";

pub struct AirQualityStub {
    image_url: String,
}

impl AirQualityStub {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
        }
    }
}

#[async_trait]
impl SourceCollector for AirQualityStub {
    fn source_id(&self) -> &str {
        "safar"
    }

    fn source_type(&self) -> SourceType {
        SourceType::AirQuality
    }

    async fn fetch(&self, _params: &FetchParams) -> Result<SourceRecord> {
        Ok(SourceRecord::new(
            self.source_id(),
            self.source_type(),
            Payload::ImagePaths(vec![self.image_url.clone()]),
        )
        .with_note(AIR_QUALITY_NOTE))
    }
}
