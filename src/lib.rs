mod backend;
mod config;
mod error;
mod host;
#[cfg(feature = "logging")]
mod logging;
mod tool;
mod types;
mod utils;
pub mod view;

pub use backend::{HttpBackend, MetadataBackend};
pub use config::{
    Endpoints, LinkToolConfig, DEFAULT_FAILURE_MESSAGE, DEFAULT_PLACEHOLDER, DEFAULT_SETTLE_DELAY,
};
pub use error::LinkToolError;
pub use host::{HostApi, HostStyles, Notification, NotifierStyle};
#[cfg(feature = "logging")]
pub use logging::{log_error_card, log_preview_card, setup_logging, LogConfig};
pub use tool::{LinkTool, PasteEvent, PasteOutcome, Phase};
pub use types::{BackendResponse, FetchResult, ImageMeta, LinkMetadata, ToolState, ToolboxDescriptor};
pub use utils::truncate_str;
pub use view::{Element, LinkView, PreviewNode, ViewHandle};
