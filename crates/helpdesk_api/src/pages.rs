//! Cursor-driven iteration over paginated collection endpoints.

use serde_json::Value;
use tracing::debug;

use crate::client::HelpdeskClient;
use crate::endpoint::Endpoint;
use crate::error::{HelpdeskError, Result};

/// Body field holding the next-page cursor.
const NEXT_PAGE_FIELD: &str = "next_page";

/// Represents one parsed response body from a paginated collection, together with its 1-based sequence number.
#[derive(Debug, Clone)]
pub struct Page {
    pub number: u32,
    pub endpoint: Endpoint,
    pub body: Value,
}

impl Page {
    /// Records under the collection key (e.g. `users`); a missing key reads as an empty page.
    pub fn records(&self, key: &str) -> &[Value] {
        self.body
            .get(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Parses the cursor, or `None` when the server sent null or omitted it.
    pub fn next_endpoint(&self) -> Result<Option<Endpoint>> {
        match self.body.get(NEXT_PAGE_FIELD) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => Endpoint::parse(raw).map(Some),
            Some(other) => Err(HelpdeskError::Serialization(format!(
                "`{NEXT_PAGE_FIELD}` is neither a string nor null: {other}"
            ))),
        }
    }

    /// Compact JSON encoding of the whole page body.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.body).map_err(HelpdeskError::from)
    }
}

/// Pull-based page sequence. Each call to [`PageIterator::next_page`] performs at most one fetch; a fresh iterator restarts from its start endpoint.
pub struct PageIterator<'a> {
    client: &'a HelpdeskClient,
    next: Option<Endpoint>,
    number: u32,
}

impl<'a> PageIterator<'a> {
    pub fn new(client: &'a HelpdeskClient, start: Endpoint) -> Self {
        Self {
            client,
            next: Some(start),
            number: 0,
        }
    }

    /// Fetches and yields the next page, or `Ok(None)` once the cursor is exhausted. Errors end the sequence.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        let Some(current) = self.next.take() else {
            return Ok(None);
        };

        let body = self.client.fetch_json(&current).await?;
        self.number += 1;
        let page = Page {
            number: self.number,
            endpoint: current,
            body,
        };

        match page.next_endpoint()? {
            Some(next) if next == page.endpoint => {
                debug!(endpoint = %page.endpoint, "next page repeats current page, stopping");
            }
            Some(next) => self.next = Some(next),
            None => {}
        }
        Ok(Some(page))
    }

    /// Sequence number of the most recently yielded page.
    pub fn pages_read(&self) -> u32 {
        self.number
    }
}

impl HelpdeskClient {
    /// Starts a fresh page traversal at `start`.
    pub fn pages(&self, start: Endpoint) -> PageIterator<'_> {
        PageIterator::new(self, start)
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Credentials;
    use crate::client::HelpdeskClient;
    use crate::config::HelpdeskConfig;
    use serde_json::json;
    use std::time::Duration;

    fn client_for(server: &mockito::ServerGuard) -> HelpdeskClient {
        let config = HelpdeskConfig::new(
            "acme.zendesk.com",
            Credentials::new("agent@example.com", "pw").unwrap(),
        )
        .with_base_url(server.url())
        .with_rate_limit_margin(Duration::ZERO);
        HelpdeskClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn yields_each_page_with_increasing_numbers() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let _mock1 = server
            .mock("GET", "/api/v2/users.json")
            .with_body(json!({"users": [{"id": 1}], "next_page": format!("{base}/api/v2/users.json?page=2")}).to_string())
            .create_async()
            .await;
        let _mock2 = server
            .mock("GET", "/api/v2/users.json?page=2")
            .with_body(json!({"users": [{"id": 2}], "next_page": format!("{base}/api/v2/users.json?page=3")}).to_string())
            .create_async()
            .await;
        let _mock3 = server
            .mock("GET", "/api/v2/users.json?page=3")
            .with_body(json!({"users": [{"id": 3}], "next_page": null}).to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let mut pages = client.pages(client.endpoint("users.json").unwrap());
        let mut seen = Vec::new();
        while let Some(page) = pages.next_page().await.unwrap() {
            seen.push((page.number, page.records("users")[0]["id"].clone()));
        }

        assert_eq!(seen, vec![(1, json!(1)), (2, json!(2)), (3, json!(3))]);
        assert!(pages.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn repeated_cursor_stops_after_one_page() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let mock = server
            .mock("GET", "/api/v2/tickets.json")
            .with_body(json!({"tickets": [], "next_page": format!("{base}/api/v2/tickets.json")}).to_string())
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let mut pages = client.pages(client.endpoint("tickets.json").unwrap());
        let first = pages.next_page().await.unwrap().expect("first page");

        assert_eq!(first.number, 1);
        assert!(pages.next_page().await.unwrap().is_none());
        assert_eq!(pages.pages_read(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_failure_propagates_to_consumer() {
        let mut server = mockito::Server::new_async().await;
        let _mock4 = server
            .mock("GET", "/api/v2/users.json")
            .with_status(502)
            .create_async()
            .await;

        let client = client_for(&server);
        let mut pages = client.pages(client.endpoint("users.json").unwrap());

        assert!(pages.next_page().await.is_err());
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock5 = server
            .mock("GET", "/api/v2/users.json")
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let mut pages = client.pages(client.endpoint("users.json").unwrap());
        let err = pages.next_page().await.unwrap_err();

        assert!(matches!(err, crate::error::HelpdeskError::Serialization(_)));
    }
}
