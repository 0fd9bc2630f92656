use crate::LinkToolError;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_FAILURE_MESSAGE: &str = "Can not get this link data, try another";
pub const DEFAULT_PLACEHOLDER: &str = "Paste a link here";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    /// Base URL of the metadata service; the pasted link is sent as `?url=`.
    #[serde(default)]
    pub by_url: Option<String>,
}

/// Tool configuration as supplied by the host editor.
///
/// The host usually passes JSON such as
/// `{ "endpoints": { "byUrl": "https://example.com/fetchUrl" } }`; every
/// other field falls back to its default.
///
/// # Examples
/// ```
/// use link_tool::LinkToolConfig;
/// use std::time::Duration;
///
/// let config = LinkToolConfig::default()
///     .with_endpoint("http://localhost:8008/fetchUrl")
///     .with_settle_delay(Duration::from_millis(50));
/// assert_eq!(config.settle_delay(), Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkToolConfig {
    pub endpoints: Endpoints,
    pub settle_delay_ms: u64,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub placeholder: String,
    pub failure_message: String,
}

impl Default for LinkToolConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
            timeout_secs: 10,
            user_agent: concat!("link-tool/", env!("CARGO_PKG_VERSION")).to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            failure_message: DEFAULT_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl LinkToolConfig {
    pub fn from_json(raw: &str) -> Result<Self, LinkToolError> {
        serde_json::from_str(raw).map_err(|e| LinkToolError::Config(e.to_string()))
    }

    pub fn with_endpoint(mut self, by_url: impl Into<String>) -> Self {
        self.endpoints.by_url = Some(by_url.into());
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
