//! In-memory view of a link block.
//!
//! The tool never touches a real DOM. It builds a small element tree that the
//! host can inspect, mirror into its own UI layer, or serialize with
//! [`ViewHandle::to_html`].

use crate::host::HostStyles;
use crate::types::ToolState;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const CSS_WRAPPER: &str = "link-tool";
pub const CSS_INPUT: &str = "link-tool__input";
pub const CSS_INPUT_LOADING: &str = "link-tool__input--loading";
pub const CSS_CONTENT: &str = "link-tool__content";
pub const CSS_CONTENT_RENDERED: &str = "link-tool__content--rendered";
pub const CSS_IMAGE: &str = "link-tool__image";
pub const CSS_TITLE: &str = "link-tool__title";
pub const CSS_DESCRIPTION: &str = "link-tool__description";
pub const CSS_ANCHOR: &str = "link-tool__anchor";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an element with the given classes and attributes.
    /// Empty class names are skipped.
    pub fn make<C, S>(tag: &str, classes: C, attributes: &[(&str, &str)]) -> Self
    where
        C: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tag: tag.to_string(),
            classes: classes
                .into_iter()
                .map(|c| c.as_ref().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        self.style.insert(property.to_string(), value.into());
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_html(&self.classes.join(" ")));
        }
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
        }
        if !self.style.is_empty() {
            let style = self
                .style
                .iter()
                .map(|(k, v)| format!("{k}: {v};"))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(out, " style=\"{}\"", escape_html(&style));
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_html(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Preview holder; each child is only present once populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewNode {
    pub rendered: bool,
    pub image: Option<Element>,
    pub title: Option<Element>,
    pub description: Option<Element>,
    pub anchor: Option<Element>,
}

impl PreviewNode {
    fn populate(&mut self, state: &ToolState) {
        let meta = &state.link_data;

        if let Some(url) = meta.image_url() {
            let mut image = Element::make("div", [CSS_IMAGE], &[]);
            image.set_style("background-image", format!("url({url})"));
            self.image = Some(image);
        }

        if let Some(title) = meta.title_text() {
            let mut node = Element::make("div", [CSS_TITLE], &[]);
            node.set_text(title);
            self.title = Some(node);
        }

        if let Some(description) = meta.description_text() {
            let mut node = Element::make("p", [CSS_DESCRIPTION], &[]);
            node.set_text(description);
            self.description = Some(node);
        }

        let mut anchor = Element::make(
            "a",
            [CSS_ANCHOR],
            &[("target", "_blank"), ("rel", "nofollow noindex noreferrer")],
        );
        anchor.set_attr("href", state.link.as_str());
        anchor.set_text(state.link.as_str());
        self.anchor = Some(anchor);

        self.rendered = true;
    }

    pub fn to_element(&self) -> Element {
        let mut holder = Element::make("div", [CSS_CONTENT], &[]);
        if self.rendered {
            holder.add_class(CSS_CONTENT_RENDERED);
        }
        holder.children = [&self.image, &self.title, &self.description, &self.anchor]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        holder
    }
}

/// Layout of one link block: an optional input followed by the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    pub container: Element,
    pub input: Option<Element>,
    pub preview: PreviewNode,
}

impl LinkView {
    pub fn input_phase(styles: &HostStyles, placeholder: &str) -> Self {
        let input = Element::make(
            "div",
            [styles.input.as_str(), CSS_INPUT],
            &[("contenteditable", "true"), ("data-placeholder", placeholder)],
        );
        Self {
            container: Self::wrapper(styles),
            input: Some(input),
            preview: PreviewNode::default(),
        }
    }

    pub fn preview_phase(styles: &HostStyles, state: &ToolState) -> Self {
        let mut view = Self {
            container: Self::wrapper(styles),
            input: None,
            preview: PreviewNode::default(),
        };
        view.preview.populate(state);
        view
    }

    fn wrapper(styles: &HostStyles) -> Element {
        Element::make("div", [styles.block.as_str(), CSS_WRAPPER], &[])
    }

    pub fn is_loading(&self) -> bool {
        self.input
            .as_ref()
            .is_some_and(|input| input.has_class(CSS_INPUT_LOADING))
    }

    pub fn show_loading(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.add_class(CSS_INPUT_LOADING);
        }
    }

    pub fn hide_loading(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.remove_class(CSS_INPUT_LOADING);
        }
    }

    /// Drops the input and fills the preview from `state`.
    pub fn show_preview(&mut self, state: &ToolState) {
        self.input = None;
        self.preview = PreviewNode::default();
        self.preview.populate(state);
    }

    pub fn to_element(&self) -> Element {
        let mut root = self.container.clone();
        root.children = self
            .input
            .iter()
            .cloned()
            .chain(std::iter::once(self.preview.to_element()))
            .collect();
        root
    }
}

/// Shared handle to a rendered view; updated in place as fetches complete.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    inner: Arc<Mutex<LinkView>>,
}

impl ViewHandle {
    pub(crate) fn new(view: LinkView) -> Self {
        Self {
            inner: Arc::new(Mutex::new(view)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LinkView> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut LinkView) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> LinkView {
        self.lock().clone()
    }

    pub fn to_element(&self) -> Element {
        self.lock().to_element()
    }

    pub fn to_html(&self) -> String {
        self.to_element().to_html()
    }

    pub fn same_view(&self, other: &ViewHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ImageMeta, LinkMetadata};

    fn state(title: &str) -> ToolState {
        ToolState::new(
            "http://example.com",
            LinkMetadata {
                title: Some(title.to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn input_comes_before_preview() {
        let view = LinkView::input_phase(&HostStyles::default(), "Paste");
        let root = view.to_element();

        assert!(root.has_class("cdx-block"));
        assert!(root.has_class(CSS_WRAPPER));
        assert_eq!(root.children.len(), 2);
        assert!(root.children[0].has_class(CSS_INPUT));
        assert!(root.children[0].has_class("cdx-input"));
        assert_eq!(root.children[0].attr("data-placeholder"), Some("Paste"));
        assert!(root.children[1].has_class(CSS_CONTENT));
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn loading_toggles_input_class() {
        let mut view = LinkView::input_phase(&HostStyles::default(), "Paste");
        view.show_loading();
        assert!(view.is_loading());
        view.hide_loading();
        assert!(!view.is_loading());
    }

    #[test]
    fn preview_populates_present_fields_only() {
        let mut view = LinkView::input_phase(&HostStyles::default(), "Paste");
        view.show_preview(&state("Example"));

        assert!(view.input.is_none());
        assert!(view.preview.image.is_none());
        assert!(view.preview.description.is_none());
        let title = view.preview.title.as_ref().unwrap();
        assert_eq!(title.text.as_deref(), Some("Example"));
        let anchor = view.preview.anchor.as_ref().unwrap();
        assert_eq!(anchor.attr("href"), Some("http://example.com"));

        let root = view.to_element();
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].has_class(CSS_CONTENT_RENDERED));
    }

    #[test]
    fn image_sets_background() {
        let mut s = state("T");
        s.link_data.image = Some(ImageMeta {
            url: "http://example.com/i.png".into(),
        });
        let view = LinkView::preview_phase(&HostStyles::default(), &s);
        let image = view.preview.image.unwrap();
        assert_eq!(
            image.style.get("background-image").map(String::as_str),
            Some("url(http://example.com/i.png)")
        );
    }

    #[test]
    fn anchor_is_set_even_for_empty_link() {
        let view = LinkView::preview_phase(&HostStyles::default(), &ToolState::default());
        let anchor = view.preview.anchor.unwrap();
        assert_eq!(anchor.attr("href"), Some(""));
    }

    #[test]
    fn html_is_escaped() {
        let view = LinkView::preview_phase(&HostStyles::default(), &state("<b>\"hi\"</b>"));
        let html = view.to_element().to_html();
        assert!(html.contains("&lt;b&gt;&quot;hi&quot;&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }
}
