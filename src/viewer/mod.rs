//! Document viewing session infrastructure
//!
//! One [`RenderSession`] per open document: it owns the view state
//! (current page, zoom scale, pending render slot) and guarantees at most
//! one render is in flight, collapsing rapid navigation/zoom requests to
//! the latest one. Rendering itself is delegated through the
//! [`RenderBackend`] seam; the `pdf` feature supplies a MuPDF-backed
//! engine.

mod config;
mod host;
mod notify;
mod request;
mod session;
mod state;
mod text;
mod types;
mod zoom;

#[cfg(feature = "pdf")]
mod cache;
#[cfg(feature = "pdf")]
mod engine;
#[cfg(feature = "pdf")]
mod worker;

pub use config::{ConfigError, SessionConfig};
pub use host::{DesktopHost, HostError, NullHost, ViewerHost};
pub use notify::{ErrorKind, NullEvents, SessionEvents};
pub use request::{EngineRequest, EngineResponse, Generation, OpenError, RenderError};
pub use session::{RenderBackend, RenderSession};
pub use state::{Command, Effect, Phase, SessionState};
pub use text::assemble_fragments;
pub use types::*;
pub use zoom::ZoomPolicy;

#[cfg(feature = "pdf")]
pub use cache::{CacheKey, PageCache};
#[cfg(feature = "pdf")]
pub use engine::{EngineHandle, MupdfEngine};
#[cfg(feature = "pdf")]
pub use worker::{render_page, render_worker};
