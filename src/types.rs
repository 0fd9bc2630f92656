use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata describing a link, as returned by the preview backend.
///
/// Every field is optional. Keys this crate does not know about are kept in
/// `extra` so that saving hands back exactly what the backend produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMeta {
    #[serde(default)]
    pub url: String,
}

impl LinkMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.extra.is_empty()
    }

    pub fn title_text(&self) -> Option<&str> {
        self.title.as_deref().filter(|s| !s.is_empty())
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref().filter(|s| !s.is_empty())
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .map(|image| image.url.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// The value a block hands back to its host on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolState {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub link_data: LinkMetadata,
}

impl ToolState {
    pub fn new(link: impl Into<String>, link_data: LinkMetadata) -> Self {
        Self {
            link: link.into(),
            link_data,
        }
    }
}

/// Outcome of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Success(LinkMetadata),
    Failure(String),
}

/// Wire envelope of the backend's answer: `{ "success": 0|1, "meta": {...} }`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendResponse {
    #[serde(default)]
    pub success: Value,
    #[serde(default)]
    pub meta: Option<LinkMetadata>,
    #[serde(default)]
    pub message: Option<String>,
}

impl BackendResponse {
    /// Backends report `success` as 0/1, a bool, or occasionally a string.
    pub fn is_success(&self) -> bool {
        match &self.success {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Value::String(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub fn into_result(self) -> FetchResult {
        if !self.is_success() {
            let reason = self
                .message
                .unwrap_or_else(|| format!("success flag was {}", self.success));
            return FetchResult::Failure(reason);
        }
        match self.meta {
            Some(meta) => FetchResult::Success(meta),
            None => FetchResult::Failure("response carried no meta".to_string()),
        }
    }
}

/// Static metadata a host uses to list the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolboxDescriptor {
    pub icon: &'static str,
    pub title: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_defaults_missing_fields() {
        let state: ToolState = serde_json::from_value(json!({ "link": "x" })).unwrap();
        assert_eq!(state.link, "x");
        assert!(state.link_data.is_empty());

        let state: ToolState = serde_json::from_value(json!({})).unwrap();
        assert_eq!(state, ToolState::default());
    }

    #[test]
    fn metadata_keeps_unknown_keys() {
        let raw = json!({
            "title": "Example",
            "image": { "url": "http://example.com/a.png" },
            "site_name": "Example Site"
        });
        let meta: LinkMetadata = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(meta.title_text(), Some("Example"));
        assert_eq!(meta.image_url(), Some("http://example.com/a.png"));
        assert_eq!(meta.extra.get("site_name"), Some(&json!("Example Site")));
        assert_eq!(serde_json::to_value(&meta).unwrap(), raw);
    }

    #[test]
    fn empty_strings_are_not_rendered() {
        let meta = LinkMetadata {
            title: Some(String::new()),
            image: Some(ImageMeta::default()),
            ..Default::default()
        };
        assert!(!meta.is_empty());
        assert_eq!(meta.title_text(), None);
        assert_eq!(meta.image_url(), None);
    }

    #[test]
    fn success_flag_variants() {
        let parse = |v: Value| serde_json::from_value::<BackendResponse>(v).unwrap();

        assert!(parse(json!({ "success": 1, "meta": {} })).is_success());
        assert!(parse(json!({ "success": true, "meta": {} })).is_success());
        assert!(parse(json!({ "success": "1" })).is_success());
        assert!(!parse(json!({ "success": 0 })).is_success());
        assert!(!parse(json!({ "success": "false" })).is_success());
        assert!(!parse(json!({})).is_success());
    }

    #[test]
    fn success_without_meta_is_failure() {
        let response: BackendResponse =
            serde_json::from_value(json!({ "success": 1 })).unwrap();
        assert!(matches!(response.into_result(), FetchResult::Failure(_)));

        let response: BackendResponse =
            serde_json::from_value(json!({ "success": 1, "meta": { "title": "T" } })).unwrap();
        match response.into_result() {
            FetchResult::Success(meta) => assert_eq!(meta.title.as_deref(), Some("T")),
            other => panic!("expected success, got {:?}", other),
        }
    }
}
