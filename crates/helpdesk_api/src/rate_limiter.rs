//! Cooldown handling for "429 Too Many Requests" responses.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use tokio::time::sleep;
use tracing::warn;

use crate::endpoint::Endpoint;

/// Represents the wait policy applied when the server throttles a request: the advertised `Retry-After` plus a fixed safety margin.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    margin: Duration,
}

impl RateLimiter {
    /// Creates a limiter that pads every server cooldown by `margin`.
    pub fn new(margin: Duration) -> Self {
        Self { margin }
    }

    /// Computes the full wait for a throttled response; a missing or unparsable header counts as zero seconds.
    pub fn cooldown_for(&self, headers: &HeaderMap) -> Duration {
        let advertised = headers
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Duration::from_secs(advertised) + self.margin
    }

    /// Suspends only the calling task for the computed cooldown and returns how long it slept.
    pub async fn wait(&self, endpoint: &Endpoint, headers: &HeaderMap) -> Duration {
        let cooldown = self.cooldown_for(headers);
        warn!(
            endpoint = %endpoint,
            seconds = cooldown.as_secs_f64(),
            "rate limited, sleeping before retry"
        );
        sleep(cooldown).await;
        cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::RateLimiter;
    use crate::endpoint::Endpoint;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use std::time::{Duration, Instant};

    #[test]
    fn retry_after_five_waits_sixty_five_seconds() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));

        assert_eq!(limiter.cooldown_for(&headers), Duration::from_secs(65));
    }

    #[test]
    fn missing_header_waits_only_the_margin() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        assert_eq!(limiter.cooldown_for(&HeaderMap::new()), Duration::from_secs(60));

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));
        assert_eq!(limiter.cooldown_for(&headers), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn wait_sleeps_for_cooldown() {
        let limiter = RateLimiter::new(Duration::from_millis(40));
        let endpoint = Endpoint::parse("https://acme.zendesk.com/api/v2/users.json").unwrap();
        let start = Instant::now();
        let waited = limiter.wait(&endpoint, &HeaderMap::new()).await;

        assert_eq!(waited, Duration::from_millis(40));
        assert!(start.elapsed() >= Duration::from_millis(35));
    }
}
