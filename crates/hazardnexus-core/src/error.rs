//! Error types for HazardNexus

/// Result type alias using HazardNexus's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for HazardNexus operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failures talking to an upstream source
    #[error("network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("upstream returned HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Upstream did not answer within the per-call timeout
    #[error("operation timed out")]
    Timeout,

    /// Malformed feed, page, or response body
    #[error("parse error: {0}")]
    Parse(String),

    /// No rasterization backend is available on this host
    #[error("document rendering unavailable")]
    RenderUnavailable,

    /// Configuration errors (including storage roots that cannot be created)
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error belongs to the network family (degrade and continue)
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::HttpStatus { .. } | Self::Timeout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_family_covers_status_and_timeout() {
        assert!(Error::network("reset").is_network());
        assert!(Error::Timeout.is_network());
        assert!(Error::HttpStatus {
            status: 503,
            url: "http://example.test".to_string()
        }
        .is_network());
        assert!(!Error::parse("bad json").is_network());
        assert!(!Error::RenderUnavailable.is_network());
    }

    #[test]
    fn status_error_message_names_url() {
        let err = Error::HttpStatus {
            status: 404,
            url: "http://example.test/x".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "upstream returned HTTP 404 for http://example.test/x"
        );
    }
}
