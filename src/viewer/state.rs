//! Render session state management
//!
//! Pure state machine: [`SessionState::apply`] consumes one command (a
//! caller operation or an engine event) and returns the effects the
//! session must execute. At most one render is ever in flight; newer
//! page/zoom requests overwrite the single pending slot, so a burst of
//! navigation collapses to one extra render targeting the latest request.

use std::sync::Arc;

use super::config::SessionConfig;
use super::notify::ErrorKind;
use super::request::{Generation, OpenError, RenderError};
use super::text::assemble_fragments;
use super::types::{DocumentInfo, RenderTarget, RenderedPage};
use super::zoom::ZoomPolicy;

/// Lifecycle phase of the session
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    /// No document
    Idle,
    /// Waiting for the engine to open a document
    Opening,
    /// Document open, no render active
    Ready,
    /// A render is in flight
    Rendering { in_flight: RenderTarget },
    /// A render is in flight and a newer request has been recorded
    RenderingWithPending {
        in_flight: RenderTarget,
        pending: RenderTarget,
    },
}

/// Commands that drive the session state
#[derive(Clone, Debug)]
pub enum Command {
    /// Open a document, discarding any current one
    Open { url: String },
    /// Discard the document and return to idle
    Close,
    /// Navigate to a page (clamped to the document range)
    GoToPage(u32),
    /// Navigate one page forward
    NextPage,
    /// Navigate one page back
    PreviousPage,
    /// Set the zoom scale (clamped to the configured range)
    SetZoom(f32),
    /// Increase the zoom scale by an additive step
    ZoomIn(f32),
    /// Decrease the zoom scale by an additive step
    ZoomOut(f32),
    /// Engine event: document opened
    Opened {
        generation: Generation,
        info: DocumentInfo,
    },
    /// Engine event: document open failed
    OpenFailed {
        generation: Generation,
        error: OpenError,
    },
    /// Engine event: page render completed
    Rendered {
        generation: Generation,
        page: u32,
        scale: f32,
        data: Arc<RenderedPage>,
    },
    /// Engine event: page render failed
    RenderFailed {
        generation: Generation,
        page: u32,
        scale: f32,
        error: RenderError,
    },
}

/// Effects produced by state transitions
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Ask the engine to open a document
    OpenDocument { generation: Generation, url: String },
    /// Ask the engine to render a page
    StartRender {
        generation: Generation,
        target: RenderTarget,
    },
    /// Paint a rendered page into the surface
    PresentPage { data: Arc<RenderedPage> },
    /// Publish the presented page to the UI
    PublishPage { page: u32, page_count: u32 },
    /// Publish the presented scale to the UI
    PublishZoom { scale: f32 },
    /// Publish the extracted text to the UI
    PublishText { text: String },
    /// Publish a failure to the UI
    PublishError { kind: ErrorKind, message: String },
    /// Show or hide the loading indicator
    SetLoading(bool),
    /// Blank the surface and drop extracted text
    ClearSurface,
}

/// Current state of a viewing session.
///
/// `current_page` is 1-indexed; 0 means no page has been presented yet
/// (only observable between an open and its first render completion).
#[derive(Clone, Debug)]
pub struct SessionState {
    policy: ZoomPolicy,
    reset_scale_on_open: bool,
    generation: Generation,
    phase: Phase,
    source_url: Option<String>,
    info: Option<DocumentInfo>,
    current_page: u32,
    scale: f32,
}

impl SessionState {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let policy = config.zoom_policy();
        Self {
            policy,
            reset_scale_on_open: config.reset_scale_on_open,
            generation: Generation::new(0),
            phase: Phase::Idle,
            source_url: None,
            info: None,
            current_page: 0,
            scale: policy.default_scale,
        }
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Page currently presented (0 before the first render completes)
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.info.as_ref().map_or(0, |info| info.page_count)
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    #[must_use]
    pub fn document_info(&self) -> Option<&DocumentInfo> {
        self.info.as_ref()
    }

    /// True while an open or a render is outstanding
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase,
            Phase::Opening | Phase::Rendering { .. } | Phase::RenderingWithPending { .. }
        )
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::Open { url } => self.open(url),
            Command::Close => self.close(),
            Command::GoToPage(page) => self.navigate(page),
            Command::NextPage => self.navigate(self.effective_page().saturating_add(1)),
            Command::PreviousPage => self.navigate(self.effective_page().saturating_sub(1)),
            Command::SetZoom(scale) => self.set_zoom(scale),
            Command::ZoomIn(step) => self.set_zoom(self.effective_scale() + step),
            Command::ZoomOut(step) => self.set_zoom(self.effective_scale() - step),
            Command::Opened { generation, info } => self.on_opened(generation, info),
            Command::OpenFailed { generation, error } => self.on_open_failed(generation, &error),
            Command::Rendered {
                generation,
                page,
                scale,
                data,
            } => self.on_rendered(generation, page, scale, &data),
            Command::RenderFailed {
                generation,
                page,
                scale,
                error,
            } => self.on_render_failed(generation, page, scale, &error),
        }
    }

    fn open(&mut self, url: String) -> Vec<Effect> {
        self.generation.bump();
        self.phase = Phase::Opening;
        self.info = None;
        self.current_page = 0;
        self.source_url = Some(url.clone());
        if self.reset_scale_on_open {
            self.scale = self.policy.default_scale;
        }

        vec![
            Effect::SetLoading(true),
            Effect::OpenDocument {
                generation: self.generation,
                url,
            },
        ]
    }

    fn close(&mut self) -> Vec<Effect> {
        self.generation.bump();
        self.phase = Phase::Idle;
        self.info = None;
        self.current_page = 0;
        self.source_url = None;

        vec![Effect::ClearSurface, Effect::SetLoading(false)]
    }

    fn navigate(&mut self, requested: u32) -> Vec<Effect> {
        if !self.document_open() {
            return vec![];
        }

        let page = requested.clamp(1, self.page_count());
        if page == self.effective_page() {
            return vec![];
        }

        self.request_render(RenderTarget {
            page,
            scale: self.effective_scale(),
        })
    }

    fn set_zoom(&mut self, requested: f32) -> Vec<Effect> {
        if !self.document_open() {
            return vec![];
        }

        let scale = self.policy.clamp(requested);
        if (scale - self.effective_scale()).abs() <= f32::EPSILON {
            return vec![];
        }

        self.request_render(RenderTarget {
            page: self.effective_page(),
            scale,
        })
    }

    fn request_render(&mut self, target: RenderTarget) -> Vec<Effect> {
        match self.phase {
            Phase::Ready => {
                self.phase = Phase::Rendering { in_flight: target };
                vec![
                    Effect::SetLoading(true),
                    Effect::StartRender {
                        generation: self.generation,
                        target,
                    },
                ]
            }

            Phase::Rendering { in_flight }
            | Phase::RenderingWithPending { in_flight, .. } => {
                self.phase = Phase::RenderingWithPending {
                    in_flight,
                    pending: target,
                };
                vec![]
            }

            Phase::Idle | Phase::Opening => vec![],
        }
    }

    fn on_opened(&mut self, generation: Generation, info: DocumentInfo) -> Vec<Effect> {
        if generation != self.generation || self.phase != Phase::Opening {
            return vec![];
        }

        if info.page_count == 0 {
            self.phase = Phase::Idle;
            return vec![
                Effect::PublishError {
                    kind: ErrorKind::OpenFailed,
                    message: "document has no pages".to_string(),
                },
                Effect::SetLoading(false),
            ];
        }

        self.info = Some(info);
        let target = RenderTarget {
            page: 1,
            scale: self.scale,
        };
        self.phase = Phase::Rendering { in_flight: target };

        vec![Effect::StartRender { generation, target }]
    }

    fn on_open_failed(&mut self, generation: Generation, error: &OpenError) -> Vec<Effect> {
        if generation != self.generation || self.phase != Phase::Opening {
            return vec![];
        }

        self.phase = Phase::Idle;
        self.source_url = None;

        vec![
            Effect::PublishError {
                kind: ErrorKind::OpenFailed,
                message: error.to_string(),
            },
            Effect::SetLoading(false),
        ]
    }

    fn on_rendered(
        &mut self,
        generation: Generation,
        page: u32,
        scale: f32,
        data: &Arc<RenderedPage>,
    ) -> Vec<Effect> {
        if generation != self.generation {
            return vec![];
        }

        let pending = match self.phase {
            Phase::Rendering { .. } => None,
            Phase::RenderingWithPending { pending, .. } => Some(pending),
            _ => return vec![],
        };

        let mut effects = vec![Effect::PresentPage {
            data: Arc::clone(data),
        }];

        if page != self.current_page {
            effects.push(Effect::PublishPage {
                page,
                page_count: self.page_count(),
            });
        }
        if (scale - self.scale).abs() > f32::EPSILON {
            effects.push(Effect::PublishZoom { scale });
        }
        effects.push(Effect::PublishText {
            text: assemble_fragments(&data.fragments),
        });

        self.current_page = page;
        self.scale = scale;

        effects.extend(self.schedule_after_render(pending));
        effects
    }

    fn on_render_failed(
        &mut self,
        generation: Generation,
        page: u32,
        scale: f32,
        error: &RenderError,
    ) -> Vec<Effect> {
        if generation != self.generation {
            return vec![];
        }

        let pending = match self.phase {
            Phase::Rendering { .. } => None,
            Phase::RenderingWithPending { pending, .. } => Some(pending),
            _ => return vec![],
        };

        let mut effects = vec![Effect::PublishError {
            kind: ErrorKind::RenderFailed,
            message: format!("page {page} at {scale:.2}x: {error}"),
        }];

        effects.extend(self.schedule_after_render(pending));
        effects
    }

    /// Shared completion/failure scheduling: start the pending render if
    /// one was recorded, otherwise settle back to ready.
    fn schedule_after_render(&mut self, pending: Option<RenderTarget>) -> Vec<Effect> {
        match pending {
            Some(target) => {
                self.phase = Phase::Rendering { in_flight: target };
                vec![Effect::StartRender {
                    generation: self.generation,
                    target,
                }]
            }
            None => {
                self.phase = Phase::Ready;
                vec![Effect::SetLoading(false)]
            }
        }
    }

    fn document_open(&self) -> bool {
        matches!(
            self.phase,
            Phase::Ready | Phase::Rendering { .. } | Phase::RenderingWithPending { .. }
        )
    }

    /// Page of the most current target: pending if set, else in-flight,
    /// else the presented page
    fn effective_page(&self) -> u32 {
        match &self.phase {
            Phase::RenderingWithPending { pending, .. } => pending.page,
            Phase::Rendering { in_flight } => in_flight.page,
            _ => self.current_page,
        }
    }

    fn effective_scale(&self) -> f32 {
        match &self.phase {
            Phase::RenderingWithPending { pending, .. } => pending.scale,
            Phase::Rendering { in_flight } => in_flight.scale,
            _ => self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::{ImageData, TextFragment};
    use super::*;

    fn test_state() -> SessionState {
        SessionState::new(&SessionConfig::default())
    }

    fn page_data(fragments: Vec<TextFragment>) -> Arc<RenderedPage> {
        Arc::new(RenderedPage {
            image: ImageData {
                pixels: vec![0; 12],
                width_px: 2,
                height_px: 2,
            },
            fragments,
        })
    }

    fn info(pages: u32) -> DocumentInfo {
        DocumentInfo {
            page_count: pages,
            title: None,
        }
    }

    /// Drive a fresh state to `Ready` on page 1 of an n-page document
    fn ready_state(pages: u32) -> SessionState {
        let mut state = test_state();
        let _ = state.apply(Command::Open {
            url: "doc.pdf".to_string(),
        });
        let generation = state.generation();
        let _ = state.apply(Command::Opened {
            generation,
            info: info(pages),
        });
        let _ = state.apply(Command::Rendered {
            generation,
            page: 1,
            scale: 1.0,
            data: page_data(vec![]),
        });
        assert_eq!(*state.phase(), Phase::Ready);
        state
    }

    fn render_starts(effects: &[Effect]) -> Vec<RenderTarget> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::StartRender { target, .. } => Some(*target),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn open_requests_document_and_loading() {
        let mut state = test_state();
        let effects = state.apply(Command::Open {
            url: "doc.pdf".to_string(),
        });

        assert_eq!(*state.phase(), Phase::Opening);
        assert_eq!(effects[0], Effect::SetLoading(true));
        assert_eq!(
            effects[1],
            Effect::OpenDocument {
                generation: state.generation(),
                url: "doc.pdf".to_string(),
            }
        );
    }

    #[test]
    fn opened_renders_first_page() {
        let mut state = test_state();
        let _ = state.apply(Command::Open {
            url: "doc.pdf".to_string(),
        });
        let generation = state.generation();

        let effects = state.apply(Command::Opened {
            generation,
            info: info(10),
        });

        assert_eq!(state.page_count(), 10);
        assert_eq!(
            render_starts(&effects),
            vec![RenderTarget {
                page: 1,
                scale: 1.0
            }]
        );
    }

    #[test]
    fn opened_with_zero_pages_fails_open() {
        let mut state = test_state();
        let _ = state.apply(Command::Open {
            url: "empty.pdf".to_string(),
        });
        let generation = state.generation();

        let effects = state.apply(Command::Opened {
            generation,
            info: info(0),
        });

        assert_eq!(*state.phase(), Phase::Idle);
        assert!(matches!(
            effects[0],
            Effect::PublishError {
                kind: ErrorKind::OpenFailed,
                ..
            }
        ));
        assert_eq!(effects[1], Effect::SetLoading(false));
    }

    #[test]
    fn open_failure_returns_to_idle() {
        let mut state = test_state();
        let _ = state.apply(Command::Open {
            url: "missing.pdf".to_string(),
        });
        let generation = state.generation();

        let effects = state.apply(Command::OpenFailed {
            generation,
            error: OpenError::NotFound("missing.pdf".to_string()),
        });

        assert_eq!(*state.phase(), Phase::Idle);
        assert!(state.source_url().is_none());
        assert!(matches!(
            effects[0],
            Effect::PublishError {
                kind: ErrorKind::OpenFailed,
                ..
            }
        ));
    }

    #[test]
    fn stale_opened_is_ignored() {
        let mut state = test_state();
        let _ = state.apply(Command::Open {
            url: "a.pdf".to_string(),
        });
        let stale = state.generation();
        let _ = state.apply(Command::Open {
            url: "b.pdf".to_string(),
        });

        let effects = state.apply(Command::Opened {
            generation: stale,
            info: info(10),
        });

        assert!(effects.is_empty());
        assert_eq!(*state.phase(), Phase::Opening);
    }

    #[test]
    fn go_to_page_starts_render_when_ready() {
        let mut state = ready_state(10);
        let effects = state.apply(Command::GoToPage(5));

        assert_eq!(
            render_starts(&effects),
            vec![RenderTarget {
                page: 5,
                scale: 1.0
            }]
        );
        assert!(matches!(state.phase(), Phase::Rendering { .. }));
    }

    #[test]
    fn go_to_page_clamps_to_range() {
        let mut state = ready_state(10);
        let effects = state.apply(Command::GoToPage(999));
        assert_eq!(render_starts(&effects)[0].page, 10);
    }

    #[test]
    fn go_to_current_page_is_noop() {
        let mut state = ready_state(10);
        let effects = state.apply(Command::GoToPage(1));
        assert!(effects.is_empty());
        assert_eq!(*state.phase(), Phase::Ready);
    }

    #[test]
    fn previous_at_first_page_is_noop() {
        let mut state = ready_state(10);
        assert!(state.apply(Command::PreviousPage).is_empty());
    }

    #[test]
    fn next_at_last_page_is_noop() {
        let mut state = ready_state(3);
        let _ = state.apply(Command::GoToPage(3));
        let generation = state.generation();
        let _ = state.apply(Command::Rendered {
            generation,
            page: 3,
            scale: 1.0,
            data: page_data(vec![]),
        });

        assert!(state.apply(Command::NextPage).is_empty());
    }

    #[test]
    fn navigation_while_rendering_overwrites_pending() {
        let mut state = ready_state(10);
        let _ = state.apply(Command::GoToPage(5));

        assert!(state.apply(Command::GoToPage(7)).is_empty());
        assert!(state.apply(Command::GoToPage(3)).is_empty());

        match state.phase() {
            Phase::RenderingWithPending { in_flight, pending } => {
                assert_eq!(in_flight.page, 5);
                assert_eq!(pending.page, 3);
            }
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[test]
    fn completion_starts_latest_pending_only() {
        let mut state = ready_state(10);
        let _ = state.apply(Command::GoToPage(5));
        let _ = state.apply(Command::GoToPage(7));
        let _ = state.apply(Command::GoToPage(3));
        let generation = state.generation();

        let effects = state.apply(Command::Rendered {
            generation,
            page: 5,
            scale: 1.0,
            data: page_data(vec![]),
        });

        assert_eq!(state.current_page(), 5);
        assert_eq!(render_starts(&effects)[0].page, 3);

        let effects = state.apply(Command::Rendered {
            generation,
            page: 3,
            scale: 1.0,
            data: page_data(vec![]),
        });
        assert_eq!(state.current_page(), 3);
        assert!(render_starts(&effects).is_empty());
        assert_eq!(*state.phase(), Phase::Ready);
    }

    #[test]
    fn next_page_chains_from_latest_target() {
        let mut state = ready_state(10);
        let _ = state.apply(Command::NextPage);
        let _ = state.apply(Command::NextPage);
        let _ = state.apply(Command::NextPage);

        match state.phase() {
            Phase::RenderingWithPending { pending, .. } => assert_eq!(pending.page, 4),
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[test]
    fn set_zoom_clamps_and_rerenders_current_page() {
        let mut state = ready_state(10);
        let effects = state.apply(Command::SetZoom(99.0));

        assert_eq!(
            render_starts(&effects),
            vec![RenderTarget {
                page: 1,
                scale: ZoomPolicy::DEFAULT_MAX_SCALE,
            }]
        );
    }

    #[test]
    fn unchanged_zoom_is_noop() {
        let mut state = ready_state(10);
        assert!(state.apply(Command::SetZoom(1.0)).is_empty());
    }

    #[test]
    fn zoom_while_rendering_targets_pending_page() {
        let mut state = ready_state(10);
        let _ = state.apply(Command::GoToPage(5));
        let _ = state.apply(Command::ZoomIn(0.25));

        match state.phase() {
            Phase::RenderingWithPending { pending, .. } => {
                assert_eq!(pending.page, 5);
                assert_eq!(pending.scale, 1.25);
            }
            other => panic!("unexpected phase: {other:?}"),
        }
    }

    #[test]
    fn render_failure_keeps_view_state() {
        let mut state = ready_state(10);
        let _ = state.apply(Command::GoToPage(4));
        let generation = state.generation();

        let effects = state.apply(Command::RenderFailed {
            generation,
            page: 4,
            scale: 1.0,
            error: RenderError::Decode("broken stream".to_string()),
        });

        assert_eq!(state.current_page(), 1);
        assert_eq!(*state.phase(), Phase::Ready);
        assert!(matches!(
            effects[0],
            Effect::PublishError {
                kind: ErrorKind::RenderFailed,
                ..
            }
        ));

        // The same page can still be rendered afterwards
        let effects = state.apply(Command::GoToPage(4));
        assert_eq!(render_starts(&effects)[0].page, 4);
    }

    #[test]
    fn render_failure_still_starts_pending() {
        let mut state = ready_state(10);
        let _ = state.apply(Command::GoToPage(4));
        let _ = state.apply(Command::GoToPage(8));
        let generation = state.generation();

        let effects = state.apply(Command::RenderFailed {
            generation,
            page: 4,
            scale: 1.0,
            error: RenderError::Decode("broken stream".to_string()),
        });

        assert_eq!(render_starts(&effects)[0].page, 8);
    }

    #[test]
    fn stale_render_result_is_discarded() {
        let mut state = ready_state(10);
        let _ = state.apply(Command::GoToPage(5));
        let stale = state.generation();

        let _ = state.apply(Command::Close);
        let _ = state.apply(Command::Open {
            url: "other.pdf".to_string(),
        });

        let effects = state.apply(Command::Rendered {
            generation: stale,
            page: 5,
            scale: 1.0,
            data: page_data(vec![]),
        });

        assert!(effects.is_empty());
        assert_eq!(*state.phase(), Phase::Opening);
        assert_eq!(state.current_page(), 0);
    }

    #[test]
    fn close_clears_surface_and_state() {
        let mut state = ready_state(10);
        let effects = state.apply(Command::Close);

        assert_eq!(*state.phase(), Phase::Idle);
        assert_eq!(state.page_count(), 0);
        assert!(state.source_url().is_none());
        assert_eq!(effects[0], Effect::ClearSurface);
    }

    #[test]
    fn navigation_without_document_is_ignored() {
        let mut state = test_state();
        assert!(state.apply(Command::GoToPage(3)).is_empty());
        assert!(state.apply(Command::SetZoom(2.0)).is_empty());
        assert!(state.apply(Command::NextPage).is_empty());
    }

    #[test]
    fn completion_publishes_page_zoom_and_text() {
        let mut state = ready_state(10);
        let _ = state.apply(Command::GoToPage(2));
        let _ = state.apply(Command::ZoomIn(0.5));
        let generation = state.generation();
        let _ = state.apply(Command::Rendered {
            generation,
            page: 2,
            scale: 1.0,
            data: page_data(vec![]),
        });

        let fragments = vec![
            TextFragment {
                text: "Hello".to_string(),
                x: 0.0,
                y: 100.0,
            },
            TextFragment {
                text: "World".to_string(),
                x: 40.0,
                y: 100.0,
            },
        ];
        let effects = state.apply(Command::Rendered {
            generation,
            page: 2,
            scale: 1.5,
            data: page_data(fragments),
        });

        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::PublishZoom { scale } if *scale == 1.5))
        );
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, Effect::PublishText { text } if text == "HelloWorld"))
        );
        // Page unchanged, so no page notification
        assert!(
            !effects
                .iter()
                .any(|e| matches!(e, Effect::PublishPage { .. }))
        );
    }

    #[test]
    fn reset_scale_on_open_applies_default() {
        let config = SessionConfig {
            reset_scale_on_open: true,
            ..SessionConfig::default()
        };
        let mut state = SessionState::new(&config);
        let _ = state.apply(Command::Open {
            url: "a.pdf".to_string(),
        });
        let generation = state.generation();
        let _ = state.apply(Command::Opened {
            generation,
            info: info(5),
        });
        let _ = state.apply(Command::Rendered {
            generation,
            page: 1,
            scale: 1.0,
            data: page_data(vec![]),
        });
        let _ = state.apply(Command::SetZoom(2.0));
        let _ = state.apply(Command::Rendered {
            generation,
            page: 1,
            scale: 2.0,
            data: page_data(vec![]),
        });
        assert_eq!(state.scale(), 2.0);

        let effects = state.apply(Command::Open {
            url: "b.pdf".to_string(),
        });
        assert_eq!(state.scale(), 1.0);
        assert!(!effects.is_empty());
    }
}
