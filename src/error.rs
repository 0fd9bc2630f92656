use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum LinkToolError {
    #[error("Metadata endpoint is not configured")]
    MissingEndpoint,

    #[error("Invalid metadata endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Failed to reach metadata backend: {0}")]
    Transport(String),

    #[error("Backend returned HTTP status {0}")]
    Status(u16),

    #[error("Request timeout: {0}")]
    Timeout(String),

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Backend rejected link: {0}")]
    Rejected(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LinkToolError {
    /// Only a backend that answered but refused the link warrants telling the user.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, LinkToolError::Rejected(_))
    }

    pub fn log(&self) {
        match self {
            LinkToolError::MissingEndpoint => {
                warn!("Fetch attempted without a byUrl endpoint");
            }
            LinkToolError::InvalidEndpoint(e) => {
                warn!(error = %e, "Endpoint URL parsing failed");
            }
            LinkToolError::Transport(e) => {
                error!(error = %e, "Metadata request failed");
            }
            LinkToolError::Status(code) => {
                error!(status = *code, "Backend answered with an error status");
            }
            LinkToolError::Timeout(e) => {
                warn!(error = %e, "Metadata request timed out");
            }
            LinkToolError::Decode(e) => {
                error!(error = %e, "Backend response could not be decoded");
            }
            LinkToolError::Rejected(e) => {
                warn!(reason = %e, "Backend reported failure");
            }
            LinkToolError::Config(e) => {
                warn!(error = %e, "Configuration error");
            }
        }
    }
}

impl From<reqwest::Error> for LinkToolError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LinkToolError::Timeout(e.to_string())
        } else if e.is_decode() {
            LinkToolError::Decode(e.to_string())
        } else {
            LinkToolError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for LinkToolError {
    fn from(e: serde_json::Error) -> Self {
        LinkToolError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_rejections_reach_the_user() {
        assert!(LinkToolError::Rejected("nope".into()).is_user_facing());
        assert!(!LinkToolError::Transport("reset".into()).is_user_facing());
        assert!(!LinkToolError::MissingEndpoint.is_user_facing());
        assert!(!LinkToolError::Decode("eof".into()).is_user_facing());
        assert!(!LinkToolError::Status(500).is_user_facing());
    }

    #[test]
    fn json_errors_map_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(LinkToolError::from(err), LinkToolError::Decode(_)));
    }
}
