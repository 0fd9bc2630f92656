use crate::types::{BackendResponse, FetchResult};
use crate::{LinkToolConfig, LinkToolError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, instrument};
use url::Url;

/// Source of link metadata.
///
/// `Ok(FetchResult::Failure)` means the backend answered but declined the
/// link; `Err` means no usable answer arrived at all.
#[async_trait]
pub trait MetadataBackend: Send + Sync {
    async fn fetch_metadata(&self, link: &str) -> Result<FetchResult, LinkToolError>;
}

/// Calls `GET <byUrl>?url=<link>` on a preview service.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    by_url: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &LinkToolConfig) -> Result<Self, LinkToolError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to create HTTP client");
                LinkToolError::Config(e.to_string())
            })?;
        debug!(endpoint = ?config.endpoints.by_url, "HTTP backend initialized");

        Ok(Self::with_client(client, config.endpoints.by_url.clone()))
    }

    pub fn with_client(client: Client, by_url: Option<String>) -> Self {
        Self { client, by_url }
    }

    /// Builds the request URL, appending `url=<link>` to any existing query.
    pub fn request_url(&self, link: &str) -> Result<Url, LinkToolError> {
        let by_url = self.by_url.as_deref().ok_or(LinkToolError::MissingEndpoint)?;
        let mut url = Url::parse(by_url)?;
        url.query_pairs_mut().append_pair("url", link);
        Ok(url)
    }
}

#[async_trait]
impl MetadataBackend for HttpBackend {
    #[instrument(level = "debug", skip(self), err)]
    async fn fetch_metadata(&self, link: &str) -> Result<FetchResult, LinkToolError> {
        let url = self.request_url(link)?;
        debug!(url = %url, "Requesting link metadata");

        let response = self.client.get(url).send().await.map_err(|e| {
            error!(error = %e, link = %link, "Failed to send request");
            LinkToolError::from(e)
        })?;
        let status = response.status();
        if !status.is_success() {
            error!(status = %status, link = %link, "Backend returned error status");
            return Err(LinkToolError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            error!(error = %e, link = %link, "Failed to read response body");
            LinkToolError::from(e)
        })?;

        let parsed: BackendResponse = serde_json::from_slice(&body).map_err(|e| {
            error!(error = %e, status = %status, "Backend returned unexpected body");
            LinkToolError::from(e)
        })?;

        let result = parsed.into_result();
        debug!(status = %status, success = matches!(result, FetchResult::Success(_)), "Backend answered");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_encodes_link() {
        let backend = HttpBackend::with_client(
            Client::new(),
            Some("http://localhost:8008/fetchUrl".to_string()),
        );
        let url = backend.request_url("http://example.com/a?b=c&d").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8008/fetchUrl?url=http%3A%2F%2Fexample.com%2Fa%3Fb%3Dc%26d"
        );
    }

    #[test]
    fn request_url_keeps_existing_query() {
        let backend = HttpBackend::with_client(
            Client::new(),
            Some("http://localhost/fetch?key=abc".to_string()),
        );
        let url = backend.request_url("x").unwrap();
        assert_eq!(url.query(), Some("key=abc&url=x"));
    }

    #[test]
    fn missing_endpoint_is_reported() {
        let backend = HttpBackend::with_client(Client::new(), None);
        assert!(matches!(
            backend.request_url("http://example.com"),
            Err(LinkToolError::MissingEndpoint)
        ));
    }

    #[test]
    fn relative_endpoint_is_invalid() {
        let backend = HttpBackend::with_client(Client::new(), Some("/fetchUrl".to_string()));
        assert!(matches!(
            backend.request_url("http://example.com"),
            Err(LinkToolError::InvalidEndpoint(_))
        ));
    }
}
