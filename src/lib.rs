//! # docview
//!
//! Render-session core for embedded PDF document viewing.
//!
//! The crate provides a single-flight render session: given an open
//! document, it serializes page rasterization so that rapid page/zoom
//! changes never race on the shared raster surface, and collapses bursts
//! of requests to the latest one. Results from a superseded document
//! (after reopen/close) are tagged with a stale generation and dropped.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use docview::viewer::{
//!     MupdfEngine, NullEvents, NullHost, RenderSession, SessionConfig,
//! };
//!
//! # struct MySurface;
//! # impl docview::viewer::Surface for MySurface {
//! #     fn prepare(&mut self, _w: u32, _h: u32) {}
//! #     fn paint(&mut self, _image: &docview::viewer::ImageData) {}
//! #     fn clear(&mut self) {}
//! # }
//! let config = SessionConfig::default();
//! let engine = MupdfEngine::new(config.cache_pages);
//! let mut session = RenderSession::new(
//!     &config,
//!     Box::new(engine.handle()),
//!     Box::new(MySurface),
//!     Box::new(NullEvents),
//!     Box::new(NullHost),
//! );
//!
//! session.open("report.pdf");
//! while session.is_busy() {
//!     if let Some(response) = engine.recv_timeout(Duration::from_secs(10)) {
//!         session.handle_response(response);
//!     }
//! }
//! ```

pub mod viewer;

pub use viewer::{RenderSession, SessionConfig};
