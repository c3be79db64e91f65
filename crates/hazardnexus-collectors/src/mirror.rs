//! Satellite image mirror

use crate::collector::{check_status, http_client, http_error, FetchParams, SourceCollector};
use crate::render::StorageLayout;
use async_trait::async_trait;
use futures::StreamExt;
use hazardnexus_core::{Error, Payload, Result, SourceRecord, SourceType};
use std::time::{Duration, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use tracing::info;

pub const MIRROR_TIMEOUT: Duration = Duration::from_secs(15);

pub const SATELLITE_FILE: &str = "satellite_live.jpg";

/// Copies one remote image into the asset directory
pub struct MirrorCollector {
    client: reqwest::Client,
    image_url: String,
    layout: StorageLayout,
}

impl MirrorCollector {
    pub fn new(
        image_url: impl Into<String>,
        layout: StorageLayout,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(MIRROR_TIMEOUT, accept_invalid_certs)?,
            image_url: image_url.into(),
            layout,
        })
    }

    /// Stream the image to disk and return its cache-busted public path
    pub async fn mirror(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.image_url)
            .send()
            .await
            .map_err(http_error)?;
        let response = check_status(response)?;

        let target = self.layout.asset_dir.join(SATELLITE_FILE);
        let partial = tempfile::Builder::new()
            .prefix(SATELLITE_FILE)
            .suffix(".part")
            .tempfile_in(&self.layout.asset_dir)?;

        let mut file = tokio::fs::File::from_std(partial.reopen()?);
        let mut stream = response.bytes_stream();
        let mut written = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(http_error)?;
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.sync_all().await?;
        drop(file);

        // The partial file is deleted on drop unless persisted
        partial
            .persist(&target)
            .map_err(|e| Error::Io(e.error))?;

        let modified = tokio::fs::metadata(&target).await?.modified()?;
        let mtime = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        info!("Mirrored {} ({} bytes)", self.image_url, written);
        Ok(format!("{}?t={}", self.layout.public_path(SATELLITE_FILE), mtime))
    }
}

#[async_trait]
impl SourceCollector for MirrorCollector {
    fn source_id(&self) -> &str {
        "satellite"
    }

    fn source_type(&self) -> SourceType {
        SourceType::SatelliteImagery
    }

    async fn fetch(&self, _params: &FetchParams) -> Result<SourceRecord> {
        let public_path = self.mirror().await?;
        Ok(SourceRecord::new(
            self.source_id(),
            self.source_type(),
            Payload::ImagePaths(vec![public_path]),
        )
        .with_origin_url(self.image_url.clone()))
    }
}
