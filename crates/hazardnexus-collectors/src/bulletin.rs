//! National weather bulletin (IMD)
//!
//! Scrapes a fixed bulletin page for the current document link and hands it
//! to the render pipeline.

use crate::collector::{get_text, http_client, FetchParams, SourceCollector};
use crate::html::{resolve_link, LinkScanner};
use crate::render::RenderPipeline;
use async_trait::async_trait;
use hazardnexus_core::{Error, Payload, Result, SourceRecord, SourceType};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const BULLETIN_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const CONVERSION_UNAVAILABLE: &str = "conversion unavailable";

const DOCUMENT_NAME: &str = "imd_weather";

pub struct BulletinCollector {
    client: reqwest::Client,
    page_url: String,
    base_url: String,
    links: LinkScanner,
    pipeline: Arc<RenderPipeline>,
}

impl BulletinCollector {
    pub fn new(
        page_url: impl Into<String>,
        base_url: impl Into<String>,
        pipeline: Arc<RenderPipeline>,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(BULLETIN_TIMEOUT, accept_invalid_certs)?,
            page_url: page_url.into(),
            base_url: base_url.into(),
            links: LinkScanner::new()?,
            pipeline,
        })
    }

    /// Absolute URL of the current bulletin document
    pub async fn discover_document(&self) -> Result<String> {
        let page = get_text(&self.client, &self.page_url).await?;
        let link = self
            .links
            .bulletin_link(&page)
            .ok_or_else(|| Error::parse(format!("no bulletin link on {}", self.page_url)))?;
        resolve_link(&self.base_url, &link)
    }
}

#[async_trait]
impl SourceCollector for BulletinCollector {
    fn source_id(&self) -> &str {
        "imd"
    }

    fn source_type(&self) -> SourceType {
        SourceType::WeatherBulletin
    }

    async fn fetch(&self, _params: &FetchParams) -> Result<SourceRecord> {
        let document_url = self.discover_document().await?;
        info!("Bulletin document: {}", document_url);

        if !self.pipeline.can_render() {
            return Ok(SourceRecord::new(
                self.source_id(),
                self.source_type(),
                Payload::ImagePaths(Vec::new()),
            )
            .with_origin_url(document_url)
            .with_note(CONVERSION_UNAVAILABLE));
        }

        let path = self
            .pipeline
            .download_document(&document_url, DOCUMENT_NAME)
            .await
            .ok_or_else(|| Error::network(format!("failed to download {document_url}")))?;
        let images = self.pipeline.render_to_images(&path, DOCUMENT_NAME).await;
        if images.is_empty() {
            return Err(Error::parse(format!("no pages rendered from {document_url}")));
        }

        Ok(SourceRecord::new(
            self.source_id(),
            self.source_type(),
            Payload::ImagePaths(images),
        )
        .with_origin_url(document_url))
    }
}
