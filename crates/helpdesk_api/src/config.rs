use std::time::Duration;

use crate::auth::Credentials;
use crate::endpoint::Endpoint;
use crate::error::Result;

pub const DEFAULT_API_PREFIX: &str = "api/v2";
pub const DEFAULT_USER_AGENT: &str = "helpdesk-dumper";
pub const DEFAULT_RATE_LIMIT_MARGIN_SECS: u64 = 60;
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;
pub const DEFAULT_CONCURRENCY: usize = 50;
/// Longest silence tolerated while waiting on a response or its body.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct HelpdeskConfig {
    pub domain: String,
    pub credentials: Credentials,
    pub base_url: String,
    pub api_prefix: String,
    pub user_agent: String,
    pub read_timeout: Duration,
    pub connect_timeout: Duration,
    pub rate_limit_margin: Duration,
    pub max_redirects: u32,
    pub concurrency: usize,
}

impl HelpdeskConfig {
    pub fn new(domain: impl Into<String>, credentials: Credentials) -> Self {
        let domain = domain.into().trim().trim_end_matches('/').to_string();
        Self {
            base_url: format!("https://{}", domain),
            domain,
            credentials,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            read_timeout: Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            rate_limit_margin: Duration::from_secs(DEFAULT_RATE_LIMIT_MARGIN_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Overrides the `https://<domain>` origin, e.g. to point at a local test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Idle limit between reads; a large download that keeps receiving data is never cut off.
    pub fn with_read_timeout(mut self, duration: Duration) -> Self {
        self.read_timeout = duration;
        self
    }

    pub fn with_connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = duration;
        self
    }

    pub fn with_rate_limit_margin(mut self, margin: Duration) -> Self {
        self.rate_limit_margin = margin;
        self
    }

    pub fn with_max_redirects(mut self, hops: u32) -> Self {
        self.max_redirects = hops;
        self
    }

    /// Sets the per-page worker ceiling; zero is clamped to one.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    pub fn api_root(&self) -> String {
        format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
    }

    /// Builds an endpoint under the API root, e.g. `users/7.json`.
    pub fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Endpoint> {
        let mut url = self.api_root();
        url.push_str(path.trim_start_matches('/'));
        Endpoint::with_query(&url, query)
    }
}

#[cfg(test)]
mod tests {
    use super::HelpdeskConfig;
    use crate::auth::Credentials;
    use std::time::Duration;

    fn config() -> HelpdeskConfig {
        HelpdeskConfig::new(
            "acme.zendesk.com",
            Credentials::new("agent@example.com", "pw").unwrap(),
        )
    }

    #[test]
    fn defaults_target_secure_domain() {
        let config = config();
        assert_eq!(config.base_url, "https://acme.zendesk.com");
        assert_eq!(config.api_root(), "https://acme.zendesk.com/api/v2/");
        assert_eq!(config.rate_limit_margin, Duration::from_secs(60));
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.concurrency, 50);
        assert_eq!(config.read_timeout, Duration::from_secs(120));
    }

    #[test]
    fn endpoint_appends_path_and_query() {
        let endpoint = config()
            .endpoint("/incremental/tickets.json", &[("start_time", "0")])
            .unwrap();
        assert_eq!(
            endpoint.as_str(),
            "https://acme.zendesk.com/api/v2/incremental/tickets.json?start_time=0"
        );
    }

    #[test]
    fn zero_concurrency_is_clamped() {
        assert_eq!(config().with_concurrency(0).concurrency, 1);
    }
}
