//! Source collector trait and shared HTTP plumbing

use async_trait::async_trait;
use hazardnexus_core::{Error, GeoPoint, Result, SourceRecord, SourceType};
use std::time::Duration;
use tracing::warn;

/// Default Overpass search radius in meters
pub const DEFAULT_RADIUS_M: u32 = 5000;

/// Per-call parameters; collectors ignore what they do not need
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FetchParams {
    pub location: Option<GeoPoint>,
    pub radius_m: Option<u32>,
}

impl FetchParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            location: Some(GeoPoint::new(lat, lon)),
            radius_m: None,
        }
    }

    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = Some(radius_m);
        self
    }

    pub(crate) fn require_location(&self, source_id: &str) -> Result<GeoPoint> {
        self.location
            .ok_or_else(|| Error::config(format!("{source_id} needs a location")))
    }
}

/// One upstream hazard signal
///
/// Implementations never panic and never let transport or parse failures
/// escape as anything other than [`Error`].
#[async_trait]
pub trait SourceCollector: Send + Sync {
    /// Stable identifier, used as the key in the snapshot
    fn source_id(&self) -> &str;

    fn source_type(&self) -> SourceType;

    async fn fetch(&self, params: &FetchParams) -> Result<SourceRecord>;

    /// Like [`fetch`](Self::fetch), with failures folded into an error record
    async fn collect(&self, params: &FetchParams) -> SourceRecord {
        match self.fetch(params).await {
            Ok(record) => record,
            Err(e) => {
                warn!("{} collection failed: {}", self.source_id(), e);
                SourceRecord::failed(self.source_id(), self.source_type(), &e)
            }
        }
    }
}

/// Build an HTTP client with a per-request timeout
pub fn http_client(timeout: Duration, accept_invalid_certs: bool) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("hazardnexus/", env!("CARGO_PKG_VERSION")))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))
}

/// Map a transport error into the error taxonomy
pub(crate) fn http_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else if let Some(status) = err.status() {
        Error::HttpStatus {
            status: status.as_u16(),
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
        }
    } else if err.is_decode() {
        Error::parse(err.to_string())
    } else {
        Error::network(err.to_string())
    }
}

/// Fail on non-2xx responses
pub(crate) fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::HttpStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

/// GET a URL and return the body as text
pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await.map_err(http_error)?;
    check_status(response)?.text().await.map_err(http_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hazardnexus_core::Payload;

    struct Failing;

    #[async_trait]
    impl SourceCollector for Failing {
        fn source_id(&self) -> &str {
            "failing"
        }

        fn source_type(&self) -> SourceType {
            SourceType::FloodReport
        }

        async fn fetch(&self, _params: &FetchParams) -> Result<SourceRecord> {
            Err(Error::parse("no recent report"))
        }
    }

    #[tokio::test]
    async fn collect_turns_errors_into_records() {
        let record = Failing.collect(&FetchParams::none()).await;

        assert_eq!(record.source_id, "failing");
        assert_eq!(record.source_type, SourceType::FloodReport);
        assert!(record.is_error());
        match record.payload {
            Payload::Error(msg) => assert!(msg.contains("no recent report")),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn location_is_required_when_asked_for() {
        assert!(FetchParams::none().require_location("poi").is_err());
        let point = FetchParams::at(28.61, 77.2).require_location("poi").unwrap();
        assert_eq!(point, GeoPoint::new(28.61, 77.2));
    }
}
