//! Daily flood bulletin (CWC)
//!
//! Report pages are published per date. Today's page is probed first and
//! yesterday's only when today has no document link yet.

use crate::bulletin::CONVERSION_UNAVAILABLE;
use crate::collector::{get_text, http_client, FetchParams, SourceCollector};
use crate::html::{resolve_link, LinkScanner};
use crate::render::RenderPipeline;
use async_trait::async_trait;
use chrono::{Duration as DateDelta, Local, NaiveDate};
use hazardnexus_core::{Error, Payload, Result, SourceRecord, SourceType};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Per-probe timeout
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const RENDER_BASE: &str = "cwc_flood";

type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// A report page that carried a document link
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLocation {
    /// `DDMMYYYY`
    pub date: String,
    pub page_url: String,
    pub document_url: String,
}

pub struct FloodReportCollector {
    client: reqwest::Client,
    base_url: String,
    links: LinkScanner,
    pipeline: Arc<RenderPipeline>,
    today: Today,
}

impl FloodReportCollector {
    pub fn new(
        base_url: impl Into<String>,
        pipeline: Arc<RenderPipeline>,
        accept_invalid_certs: bool,
    ) -> Result<Self> {
        Ok(Self {
            client: http_client(PROBE_TIMEOUT, accept_invalid_certs)?,
            base_url: base_url.into(),
            links: LinkScanner::new()?,
            pipeline,
            today: Arc::new(|| Local::now().date_naive()),
        })
    }

    /// Pin "today" to a fixed date
    pub fn with_today(mut self, date: NaiveDate) -> Self {
        self.today = Arc::new(move || date);
        self
    }

    pub fn report_page_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/en/daily-flood-bulletin-report-dated-{}",
            self.base_url.trim_end_matches('/'),
            date.format("%d%m%Y")
        )
    }

    /// Newest report page with a document link, today then yesterday
    pub async fn discover_report(&self) -> Result<ReportLocation> {
        let today = (self.today)();
        for date in [today, today - DateDelta::days(1)] {
            let page_url = self.report_page_url(date);
            debug!("Checking flood report page {}", page_url);

            let page = match get_text(&self.client, &page_url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("Flood report page {} unavailable: {}", page_url, e);
                    continue;
                }
            };

            let Some(link) = self.links.pdf_link(&page) else {
                debug!("No document link on {}", page_url);
                continue;
            };

            match resolve_link(&self.base_url, &link) {
                Ok(document_url) => {
                    return Ok(ReportLocation {
                        date: date.format("%d%m%Y").to_string(),
                        document_url,
                        page_url,
                    });
                }
                Err(e) => warn!("Unusable document link on {}: {}", page_url, e),
            }
        }

        Err(Error::parse("no recent report"))
    }
}

#[async_trait]
impl SourceCollector for FloodReportCollector {
    fn source_id(&self) -> &str {
        "cwc"
    }

    fn source_type(&self) -> SourceType {
        SourceType::FloodReport
    }

    async fn fetch(&self, _params: &FetchParams) -> Result<SourceRecord> {
        let report = self.discover_report().await?;
        info!("Flood report dated {}: {}", report.date, report.document_url);

        if !self.pipeline.can_render() {
            return Ok(SourceRecord::new(
                self.source_id(),
                self.source_type(),
                Payload::ImagePaths(Vec::new()),
            )
            .with_origin_url(report.document_url)
            .with_note(format!("{} ({})", report.date, CONVERSION_UNAVAILABLE)));
        }

        let name = format!("{}_{}", RENDER_BASE, report.date);
        let path = self
            .pipeline
            .download_document(&report.document_url, &name)
            .await
            .ok_or_else(|| {
                Error::network(format!("failed to download {}", report.document_url))
            })?;
        let images = self.pipeline.render_to_images(&path, RENDER_BASE).await;
        if images.is_empty() {
            return Err(Error::parse(format!(
                "no pages rendered from {}",
                report.document_url
            )));
        }

        Ok(SourceRecord::new(
            self.source_id(),
            self.source_type(),
            Payload::ImagePaths(images),
        )
        .with_origin_url(report.document_url)
        .with_note(report.date))
    }
}
