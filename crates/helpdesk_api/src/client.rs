use crate::config::HelpdeskConfig;
use crate::endpoint::Endpoint;
use crate::error::{HelpdeskError, Result};
use crate::rate_limiter::RateLimiter;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, LOCATION, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct HelpdeskClient {
    http: HttpClient,
    config: HelpdeskConfig,
    limiter: RateLimiter,
    // Credentials are only ever sent to this origin.
    home: Endpoint,
}

impl HelpdeskClient {
    pub fn new(config: HelpdeskConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.rate_limit_margin);
        let home = Endpoint::parse(&config.api_root())?;
        Ok(Self {
            http,
            config,
            limiter,
            home,
        })
    }

    pub fn config(&self) -> &HelpdeskConfig {
        &self.config
    }

    pub fn endpoint(&self, path: &str) -> Result<Endpoint> {
        self.config.endpoint(path, &[])
    }

    /// Authenticated GET that absorbs throttling: every 429 sleeps for `Retry-After` plus the margin and retries the same endpoint, without bound.
    pub async fn fetch(&self, endpoint: &Endpoint) -> Result<Bytes> {
        loop {
            let response = self.send(endpoint).await?;
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                self.limiter.wait(endpoint, response.headers()).await;
                continue;
            }
            if !status.is_success() {
                return Err(HelpdeskError::from_status(status, endpoint.as_str()));
            }
            return Ok(response.bytes().await?);
        }
    }

    pub async fn fetch_json(&self, endpoint: &Endpoint) -> Result<Value> {
        let body = self.fetch(endpoint).await?;
        serde_json::from_slice(&body).map_err(HelpdeskError::from)
    }

    /// Fetches an opaque binary payload, following at most `max_hops` requests' worth of redirects.
    /// Hops that leave the helpdesk origin are requested without credentials.
    pub async fn fetch_following_redirects(&self, endpoint: &Endpoint, max_hops: u32) -> Result<Bytes> {
        let mut current = endpoint.clone();
        let mut remaining = max_hops;
        loop {
            if remaining == 0 {
                return Err(HelpdeskError::TooManyRedirects {
                    endpoint: endpoint.to_string(),
                });
            }
            let response = self.send(&current).await?;
            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                self.limiter.wait(&current, response.headers()).await;
                continue;
            }
            if status.is_redirection() {
                let location = redirect_location(&response).ok_or_else(|| {
                    HelpdeskError::MissingRedirectLocation {
                        endpoint: current.to_string(),
                    }
                })?;
                let next = current.join(&location)?;
                debug!(from = %current, to = %next, remaining, "following redirect");
                current = next;
                remaining -= 1;
                continue;
            }
            if !status.is_success() {
                return Err(HelpdeskError::from_status(status, current.as_str()));
            }
            return Ok(response.bytes().await?);
        }
    }

    /// Attachment download with the configured hop budget.
    pub async fn fetch_attachment(&self, endpoint: &Endpoint) -> Result<Bytes> {
        self.fetch_following_redirects(endpoint, self.config.max_redirects)
            .await
    }

    async fn send(&self, endpoint: &Endpoint) -> Result<Response> {
        let mut request = self.http.get(endpoint.url().clone());
        if endpoint.same_origin(&self.home) {
            debug!(endpoint = %endpoint, "GET");
            let credentials = &self.config.credentials;
            request = request.basic_auth(credentials.identity(), Some(credentials.secret()));
        } else {
            debug!(endpoint = %endpoint, "GET without credentials");
        }
        Ok(request.send().await?)
    }
}

fn build_http_client(config: &HelpdeskConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    // No total deadline: attachments may take arbitrarily long while bytes keep flowing.
    HttpClient::builder()
        .default_headers(headers)
        .redirect(Policy::none())
        .read_timeout(config.read_timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| HelpdeskError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| HelpdeskError::Config(err.to_string()))
}

fn redirect_location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
