//! Render session - executes state machine effects against the engine,
//! surface, notifier, and host

use super::config::SessionConfig;
use super::host::ViewerHost;
use super::notify::{ErrorKind, SessionEvents};
use super::request::{EngineRequest, EngineResponse};
use super::state::{Command, Effect, Phase, SessionState};
use super::types::{DocumentInfo, Surface};

/// Outbound seam toward the render engine.
///
/// Submissions must not block; results come back asynchronously as
/// [`EngineResponse`] values the host feeds into
/// [`RenderSession::handle_response`].
pub trait RenderBackend {
    fn submit(&mut self, request: EngineRequest);
}

/// A single document-viewing session.
///
/// All operations return immediately; visual results are delivered through
/// the [`SessionEvents`] notifier once the engine responds. The session
/// guarantees at most one render in flight and collapses bursts of
/// navigation/zoom requests to the latest one.
pub struct RenderSession {
    state: SessionState,
    zoom_step: f32,
    backend: Box<dyn RenderBackend>,
    surface: Box<dyn Surface>,
    events: Box<dyn SessionEvents>,
    host: Box<dyn ViewerHost>,
    extracted: String,
    loading: bool,
}

impl RenderSession {
    #[must_use]
    pub fn new(
        config: &SessionConfig,
        backend: Box<dyn RenderBackend>,
        surface: Box<dyn Surface>,
        events: Box<dyn SessionEvents>,
        host: Box<dyn ViewerHost>,
    ) -> Self {
        Self {
            state: SessionState::new(config),
            zoom_step: config.zoom_step,
            backend,
            surface,
            events,
            host,
            extracted: String::new(),
            loading: false,
        }
    }

    /// Open a document, discarding any current one.
    ///
    /// An in-flight render of the old document may still complete inside
    /// the engine; its result carries a stale generation and is dropped.
    pub fn open(&mut self, url: &str) {
        log::debug!("open requested: {url}");
        self.dispatch(Command::Open {
            url: url.to_string(),
        });
    }

    /// Discard the document and return to idle
    pub fn close(&mut self) {
        log::debug!("close requested");
        self.dispatch(Command::Close);
    }

    /// Navigate to a page; out-of-range targets are clamped
    pub fn go_to_page(&mut self, page: u32) {
        self.dispatch(Command::GoToPage(page));
    }

    /// Navigate one page forward; no-op on the last page
    pub fn next_page(&mut self) {
        self.dispatch(Command::NextPage);
    }

    /// Navigate one page back; no-op on the first page
    pub fn previous_page(&mut self) {
        self.dispatch(Command::PreviousPage);
    }

    /// Set the zoom scale; out-of-range values are clamped
    pub fn set_zoom(&mut self, scale: f32) {
        self.dispatch(Command::SetZoom(scale));
    }

    /// Increase the zoom scale by the configured step
    pub fn zoom_in(&mut self) {
        self.dispatch(Command::ZoomIn(self.zoom_step));
    }

    /// Decrease the zoom scale by the configured step
    pub fn zoom_out(&mut self) {
        self.dispatch(Command::ZoomOut(self.zoom_step));
    }

    /// Feed one engine response into the session
    pub fn handle_response(&mut self, response: EngineResponse) {
        let cmd = match response {
            EngineResponse::Opened { generation, info } => Command::Opened { generation, info },
            EngineResponse::OpenFailed { generation, error } => {
                Command::OpenFailed { generation, error }
            }
            EngineResponse::Rendered {
                generation,
                page,
                scale,
                data,
            } => Command::Rendered {
                generation,
                page,
                scale,
                data,
            },
            EngineResponse::RenderFailed {
                generation,
                page,
                scale,
                error,
            } => Command::RenderFailed {
                generation,
                page,
                scale,
                error,
            },
        };
        self.dispatch(cmd);
    }

    /// Hand the current document to the host's download capability
    pub fn download(&mut self) {
        match self.state.source_url() {
            Some(url) => {
                let url = url.to_string();
                if let Err(e) = self.host.download(&url) {
                    self.events.on_error(ErrorKind::HostFailed, &e.to_string());
                }
            }
            None => {
                self.events
                    .on_error(ErrorKind::HostFailed, "no document loaded to download");
            }
        }
    }

    /// Hand the current document to the host's print capability
    pub fn print_document(&mut self) {
        match self.state.source_url() {
            Some(url) => {
                let url = url.to_string();
                if let Err(e) = self.host.print(&url) {
                    self.events.on_error(ErrorKind::HostFailed, &e.to_string());
                }
            }
            None => {
                self.events
                    .on_error(ErrorKind::HostFailed, "no document loaded to print");
            }
        }
    }

    /// Put the current page's extracted text on the host clipboard
    pub fn copy_extracted_text(&mut self) {
        if self.extracted.is_empty() {
            self.events.on_error(ErrorKind::HostFailed, "no text to copy");
            return;
        }

        let text = self.extracted.clone();
        if let Err(e) = self.host.copy_text(&text) {
            self.events.on_error(ErrorKind::HostFailed, &e.to_string());
        }
    }

    /// Page currently presented (0 before the first render completes)
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.state.current_page()
    }

    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.state.page_count()
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.state.scale()
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        self.state.phase()
    }

    #[must_use]
    pub fn document_info(&self) -> Option<&DocumentInfo> {
        self.state.document_info()
    }

    /// Extracted text of the most recently presented page
    #[must_use]
    pub fn extracted_text(&self) -> &str {
        &self.extracted
    }

    /// True while an open or a render is outstanding
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    fn dispatch(&mut self, cmd: Command) {
        let effects = self.state.apply(cmd);
        self.run_effects(effects);
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenDocument { generation, url } => {
                    self.backend.submit(EngineRequest::Open { generation, url });
                }

                Effect::StartRender { generation, target } => {
                    log::trace!(
                        "render start: page {} at {:.2}x ({generation:?})",
                        target.page,
                        target.scale
                    );
                    self.backend.submit(EngineRequest::Render {
                        generation,
                        page: target.page,
                        scale: target.scale,
                    });
                }

                Effect::PresentPage { data } => {
                    self.surface
                        .prepare(data.image.width_px, data.image.height_px);
                    self.surface.paint(&data.image);
                }

                Effect::PublishPage { page, page_count } => {
                    self.events.on_page_changed(page, page_count);
                }

                Effect::PublishZoom { scale } => {
                    self.events.on_zoom_changed(scale);
                }

                Effect::PublishText { text } => {
                    self.extracted = text;
                    self.events.on_text_extracted(&self.extracted);
                }

                Effect::PublishError { kind, message } => {
                    log::warn!("{kind:?}: {message}");
                    self.events.on_error(kind, &message);
                }

                Effect::SetLoading(loading) => {
                    if loading != self.loading {
                        self.loading = loading;
                        self.events.on_loading_state_changed(loading);
                    }
                }

                Effect::ClearSurface => {
                    self.surface.clear();
                    self.extracted.clear();
                }
            }
        }
    }
}
