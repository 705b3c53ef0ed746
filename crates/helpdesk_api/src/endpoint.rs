//! Absolute resource locators for single GET requests.

use std::fmt;

use reqwest::Url;

use crate::error::{HelpdeskError, Result};

/// Represents a fully-qualified locator for one HTTP GET request; only http(s) schemes are accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint(Url);

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|err| HelpdeskError::InvalidEndpoint(format!("{raw}: {err}")))?;
        Self::from_url(url)
    }

    pub fn with_query(raw: &str, query: &[(&str, &str)]) -> Result<Self> {
        let mut endpoint = Self::parse(raw)?;
        if !query.is_empty() {
            endpoint.0.query_pairs_mut().extend_pairs(query);
        }
        Ok(endpoint)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        match url.scheme() {
            "https" | "http" => Ok(Self(url)),
            other => Err(HelpdeskError::InvalidEndpoint(format!(
                "unsupported scheme `{other}` in {url}"
            ))),
        }
    }

    /// Resolves a redirect `Location`, which may be relative to this endpoint.
    pub fn join(&self, location: &str) -> Result<Self> {
        let url = self
            .0
            .join(location.trim())
            .map_err(|err| HelpdeskError::InvalidEndpoint(format!("{location}: {err}")))?;
        Self::from_url(url)
    }

    /// True when both endpoints share scheme, host and port.
    pub fn same_origin(&self, other: &Endpoint) -> bool {
        self.0.origin() == other.0.origin()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
