use crate::backend::{HttpBackend, MetadataBackend};
use crate::host::{HostApi, Notification};
use crate::types::{FetchResult, LinkMetadata, ToolState, ToolboxDescriptor};
use crate::view::{LinkView, ViewHandle};
use crate::{LinkToolConfig, LinkToolError};
use futures::{Stream, StreamExt};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

const TOOLBOX_ICON: &str = r#"<svg width="13" height="14" viewBox="0 0 13 14" xmlns="http://www.w3.org/2000/svg"><path d="M8.567 13.629c.728.464 1.581.65 2.41.558l-.873.873A3.722 3.722 0 1 1 4.84 9.794L6.694 7.94a3.722 3.722 0 0 1 5.256-.008L10.484 9.4a5.209 5.209 0 0 1-.017.016 1.625 1.625 0 0 0-2.29.009l-1.854 1.854a1.626 1.626 0 0 0 2.244 2.35zm2.766-7.358a3.722 3.722 0 0 0-2.41-.558l.873-.873a3.722 3.722 0 1 1 5.264 5.266l-1.854 1.854a3.722 3.722 0 0 1-5.256.008L9.416 10.5a5.2 5.2 0 0 1 .017-.016 1.625 1.625 0 0 0 2.29-.009l1.854-1.854a1.626 1.626 0 0 0-2.244-2.35z" transform="translate(-3.667 -2.7)"/></svg>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Input visible, nothing fetched.
    Empty,
    /// A fetch is in flight; the input shows the loading indicator.
    Loading,
    /// The preview is rendered and the input is gone.
    Previewed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    pub text: String,
}

impl PasteEvent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug)]
pub enum PasteOutcome {
    Previewed(LinkMetadata),
    Failed(LinkToolError),
    /// A later paste started before this one finished; its result was dropped.
    Superseded,
    /// The block already shows a preview, so there is no input to paste into.
    Ignored,
}

struct Inner {
    state: ToolState,
    phase: Phase,
    generation: u64,
    view: Option<ViewHandle>,
}

/// Link preview block tool.
///
/// Owns the block's `{link, linkData}` state, builds its view on `render`,
/// and turns a pasted URL into a preview by asking a [`MetadataBackend`].
/// Clones share the same block.
#[derive(Clone)]
pub struct LinkTool {
    inner: Arc<Mutex<Inner>>,
    config: Arc<LinkToolConfig>,
    host: Arc<dyn HostApi>,
    backend: Arc<dyn MetadataBackend>,
}

impl LinkTool {
    pub fn new(
        state: ToolState,
        config: LinkToolConfig,
        host: Arc<dyn HostApi>,
        backend: Arc<dyn MetadataBackend>,
    ) -> Self {
        let phase = if state.link_data.is_empty() {
            Phase::Empty
        } else {
            Phase::Previewed
        };
        debug!(link = %state.link, ?phase, "Link tool created");

        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                phase,
                generation: 0,
                view: None,
            })),
            config: Arc::new(config),
            host,
            backend,
        }
    }

    pub fn with_http_backend(
        state: ToolState,
        config: LinkToolConfig,
        host: Arc<dyn HostApi>,
    ) -> Result<Self, LinkToolError> {
        let backend = HttpBackend::new(&config)?;
        Ok(Self::new(state, config, host, Arc::new(backend)))
    }

    pub fn toolbox() -> ToolboxDescriptor {
        ToolboxDescriptor {
            icon: TOOLBOX_ICON,
            title: "Link",
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &LinkToolConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// The view from the latest `render`, if any.
    pub fn view(&self) -> Option<ViewHandle> {
        self.lock().view.clone()
    }

    /// Builds the block's view. Non-empty `linkData` renders straight into
    /// the preview; otherwise the input is placed before an empty preview.
    pub fn render(&self) -> ViewHandle {
        let styles = self.host.styles();
        let mut inner = self.lock();

        let view = if inner.state.link_data.is_empty() {
            let mut view = LinkView::input_phase(&styles, &self.config.placeholder);
            if inner.phase == Phase::Loading {
                view.show_loading();
            } else {
                inner.phase = Phase::Empty;
            }
            view
        } else {
            inner.phase = Phase::Previewed;
            LinkView::preview_phase(&styles, &inner.state)
        };

        let handle = ViewHandle::new(view);
        inner.view = Some(handle.clone());
        handle
    }

    pub fn save(&self) -> ToolState {
        self.lock().state.clone()
    }

    /// Snapshot of the current state.
    pub fn data(&self) -> ToolState {
        self.lock().state.clone()
    }

    /// Replaces both fields and re-derives the phase from `linkData`, unless
    /// a fetch is in flight. The view is left as is until the next `render`.
    pub fn set_data(&self, data: ToolState) {
        let mut inner = self.lock();
        if inner.phase != Phase::Loading {
            inner.phase = if data.link_data.is_empty() {
                Phase::Empty
            } else {
                Phase::Previewed
            };
        }
        inner.state = data;
    }

    /// Runs one paste-to-preview attempt to completion.
    #[instrument(level = "debug", skip(self, text))]
    pub async fn paste(&self, text: impl Into<String>) -> PasteOutcome {
        let link = text.into();

        let generation = {
            let mut inner = self.lock();
            if inner.phase == Phase::Previewed {
                debug!(link = %link, "Paste ignored, preview already shown");
                return PasteOutcome::Ignored;
            }
            inner.generation += 1;
            inner.state.link = link.clone();
            inner.phase = Phase::Loading;
            if let Some(view) = &inner.view {
                view.update(LinkView::show_loading);
            }
            inner.generation
        };
        debug!(link = %link, generation, "Fetching link data");

        match self.backend.fetch_metadata(&link).await {
            Ok(FetchResult::Success(meta)) => self.show_preview(generation, meta).await,
            Ok(FetchResult::Failure(reason)) => {
                self.fetching_failed(generation, LinkToolError::Rejected(reason))
            }
            Err(e) => self.fetching_failed(generation, e),
        }
    }

    /// Feeds every event from `events` into its own paste attempt.
    pub fn listen<S>(&self, events: S) -> JoinHandle<()>
    where
        S: Stream<Item = PasteEvent> + Send + Unpin + 'static,
    {
        let tool = self.clone();
        tokio::spawn(async move {
            let mut events = events;
            while let Some(event) = events.next().await {
                let tool = tool.clone();
                tokio::spawn(async move {
                    tool.paste(event.text).await;
                });
            }
            debug!("Paste event source closed");
        })
    }

    async fn show_preview(&self, generation: u64, meta: LinkMetadata) -> PasteOutcome {
        tokio::time::sleep(self.config.settle_delay()).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(generation, "Newer paste owns the block, dropping link data");
            return PasteOutcome::Superseded;
        }
        inner.state.link_data = meta.clone();
        inner.phase = Phase::Previewed;
        if let Some(view) = &inner.view {
            let state = inner.state.clone();
            view.update(|v| v.show_preview(&state));
        }
        info!(link = %inner.state.link, "Link preview rendered");
        #[cfg(feature = "logging")]
        crate::logging::log_preview_card(&inner.state);

        PasteOutcome::Previewed(meta)
    }

    fn fetching_failed(&self, generation: u64, error: LinkToolError) -> PasteOutcome {
        error.log();

        {
            let mut inner = self.lock();
            if inner.generation != generation {
                return PasteOutcome::Superseded;
            }
            #[cfg(feature = "logging")]
            crate::logging::log_error_card(&inner.state.link, &error);
            inner.phase = Phase::Empty;
            if let Some(view) = &inner.view {
                view.update(LinkView::hide_loading);
            }
        }

        if error.is_user_facing() {
            self.host
                .notify(Notification::error(self.config.failure_message.as_str()));
        }
        PasteOutcome::Failed(error)
    }
}
