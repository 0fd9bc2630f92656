use serde::Serialize;

/// Shared class names the host editor applies to its blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStyles {
    pub block: String,
    pub input: String,
}

impl Default for HostStyles {
    fn default() -> Self {
        Self {
            block: "cdx-block".to_string(),
            input: "cdx-input".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierStyle {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub style: NotifierStyle,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: NotifierStyle::Error,
        }
    }
}

/// The capabilities a host editor lends to the tool.
pub trait HostApi: Send + Sync {
    fn styles(&self) -> HostStyles;

    /// Fire-and-forget user notification.
    fn notify(&self, notification: Notification);
}
