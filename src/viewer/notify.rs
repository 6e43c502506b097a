//! UI notification boundary

/// Kind of failure surfaced through [`SessionEvents::on_error`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A document could not be opened; the session returned to idle
    OpenFailed,
    /// One page render failed; the displayed page is unchanged
    RenderFailed,
    /// A host-delegated action (download, print, copy) failed
    HostFailed,
}

/// Callbacks the session fires toward the hosting UI.
///
/// All methods are fire-and-forget with no-op defaults; hosts implement
/// only what they display. Out-of-range navigation and stale render
/// results never reach this trait.
pub trait SessionEvents {
    /// A new page was presented
    fn on_page_changed(&mut self, page: u32, page_count: u32) {
        let _ = (page, page_count);
    }

    /// The scale of the presented page changed
    fn on_zoom_changed(&mut self, scale: f32) {
        let _ = scale;
    }

    /// Text was extracted for the presented page
    fn on_text_extracted(&mut self, text: &str) {
        let _ = text;
    }

    /// A failure occurred; suitable for a transient banner
    fn on_error(&mut self, kind: ErrorKind, message: &str) {
        let _ = (kind, message);
    }

    /// The loading indicator should be shown or hidden.
    ///
    /// Fired only on transitions, and always eventually fired with `false`
    /// on both completion and failure paths.
    fn on_loading_state_changed(&mut self, loading: bool) {
        let _ = loading;
    }
}

/// Notifier that ignores every event
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEvents;

impl SessionEvents for NullEvents {}
