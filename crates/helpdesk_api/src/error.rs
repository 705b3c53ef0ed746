//! Error model used by helpdesk fetch and export operations.

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HelpdeskError>;

/// Represents the failures a fetch or export can surface. Rate limiting is absent on purpose: a 429 is always absorbed by the fetcher's sleep-and-retry loop.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    #[error("http {status} for {endpoint}")]
    Http { status: StatusCode, endpoint: String },
    #[error("not found: {endpoint}")]
    NotFound { endpoint: String },
    #[error("too many redirects while fetching {endpoint}")]
    TooManyRedirects { endpoint: String },
    #[error("redirect from {endpoint} carried no usable location")]
    MissingRedirectLocation { endpoint: String },
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("sink error: {0}")]
    Sink(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl HelpdeskError {
    /// Maps a non-success, non-429 status to its error variant; 404 becomes `NotFound`.
    pub fn from_status(status: StatusCode, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        if status == StatusCode::NOT_FOUND {
            HelpdeskError::NotFound { endpoint }
        } else {
            HelpdeskError::Http { status, endpoint }
        }
    }

    /// Returns true for the only failure the exporter recovers from per item.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HelpdeskError::NotFound { .. })
    }
}

impl From<reqwest::Error> for HelpdeskError {
    /// Converts reqwest errors into semantic HelpdeskError variants.
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|url| url.to_string())
            .unwrap_or_default();
        if err.is_timeout() {
            HelpdeskError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            HelpdeskError::from_status(status, endpoint)
        } else if err.is_connect() || err.is_request() {
            HelpdeskError::Network(err.to_string())
        } else if err.is_decode() {
            HelpdeskError::Serialization(err.to_string())
        } else {
            HelpdeskError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for HelpdeskError {
    /// Converts serde_json decode/encode failures into serialization errors.
    fn from(err: serde_json::Error) -> Self {
        HelpdeskError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::HelpdeskError;
    use reqwest::StatusCode;

    #[test]
    fn not_found_status_maps_to_not_found_variant() {
        let err = HelpdeskError::from_status(StatusCode::NOT_FOUND, "https://x/api/v2/users/7.json");
        assert!(err.is_not_found());
        assert!(matches!(err, HelpdeskError::NotFound { ref endpoint } if endpoint.ends_with("users/7.json")));
    }

    #[test]
    fn other_statuses_stay_generic_http_errors() {
        let err = HelpdeskError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "https://x/");
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("500"));
    }
}
