//! HTTP backend for the item service.
//!
//! Routes:
//!
//! | Call          | Request                    |
//! |---------------|----------------------------|
//! | `create_item` | `POST {endpoint}/item`     |
//! | `get_item`    | `GET {endpoint}/item/{id}` |
//! | `update_item` | `PUT {endpoint}/item/{id}` |
//! | `delete_item` | `DELETE {endpoint}/item/{id}` |

use crate::backend::ItemClient;
use crate::error::{Error, Result};
use crate::types::Item;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::time::Duration;

/// Default service endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3001";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = "blogctl";

/// Characters escaped in a single path segment (RFC 3986 `pchar` complement).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Blocking HTTP client for the item service.
///
/// # Example
///
/// ```no_run
/// use blogapi::{HttpClient, ItemClient};
///
/// let client = HttpClient::new("http://localhost:3001");
/// let item = client.get_item("post-1").unwrap();
/// println!("{}: {}", item.name, item.description);
/// ```
pub struct HttpClient {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// Service base URL, without trailing slash.
    endpoint: String,
}

impl HttpClient {
    /// Create a client for `endpoint` with the default timeout.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a client for `endpoint` with a global per-request timeout.
    #[must_use]
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self { agent, endpoint }
    }

    /// Get the service endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// URL of the item collection.
    fn collection_url(&self) -> String {
        format!("{}/item", self.endpoint)
    }

    /// URL of a single item, with `id` escaped as one path segment.
    fn item_url(&self, id: &str) -> String {
        format!(
            "{}/item/{}",
            self.endpoint,
            utf8_percent_encode(id, PATH_SEGMENT)
        )
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl ItemClient for HttpClient {
    fn create_item(&self, item: &Item) -> Result<()> {
        let url = self.collection_url();
        log::debug!("POST {}", url);

        self.agent
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .send_json(item)
            .map_err(|e| Error::from_transport(e, &item.name))?;
        Ok(())
    }

    fn get_item(&self, id: &str) -> Result<Item> {
        let url = self.item_url(id);
        log::debug!("GET {}", url);

        let item: Item = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| Error::from_transport(e, id))?
            .body_mut()
            .read_json()
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;

        Ok(item)
    }

    fn update_item(&self, item: &Item) -> Result<()> {
        let url = self.item_url(&item.name);
        log::debug!("PUT {}", url);

        self.agent
            .put(&url)
            .header("User-Agent", USER_AGENT)
            .send_json(item)
            .map_err(|e| Error::from_transport(e, &item.name))?;
        Ok(())
    }

    fn delete_item(&self, id: &str) -> Result<()> {
        let url = self.item_url(id);
        log::debug!("DELETE {}", url);

        self.agent
            .delete(&url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| Error::from_transport(e, id))?;
        Ok(())
    }
}
