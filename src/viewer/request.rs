//! Engine request and response types

use std::sync::Arc;

use super::types::{DocumentInfo, RenderedPage};

/// Session generation, bumped on every open/close.
///
/// Engine responses echo the generation of the request that produced them;
/// responses whose generation no longer matches the session are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Advance to the next generation
    pub fn bump(&mut self) {
        self.0 += 1;
    }
}

/// Request sent to the render engine
#[derive(Clone, Debug, PartialEq)]
pub enum EngineRequest {
    /// Open a document
    Open { generation: Generation, url: String },

    /// Render one page at one scale
    Render {
        generation: Generation,
        page: u32,
        scale: f32,
    },

    /// Shut down the engine
    Shutdown,
}

/// Response from the render engine
#[derive(Clone, Debug)]
pub enum EngineResponse {
    /// Document opened successfully
    Opened {
        generation: Generation,
        info: DocumentInfo,
    },

    /// Document could not be opened
    OpenFailed {
        generation: Generation,
        error: OpenError,
    },

    /// Page rendered successfully
    Rendered {
        generation: Generation,
        page: u32,
        scale: f32,
        data: Arc<RenderedPage>,
    },

    /// Page render failed
    RenderFailed {
        generation: Generation,
        page: u32,
        scale: f32,
        error: RenderError,
    },
}

/// Errors opening a document
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OpenError {
    /// No document exists at the given location.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The document exists but could not be read or decoded.
    #[error("document could not be read: {0}")]
    Unreadable(String),

    /// The document could not be fetched.
    #[error("network error fetching document: {0}")]
    Network(String),
}

/// Errors rendering a single page
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The requested page does not exist in the document.
    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    /// The page could not be decoded or rasterized.
    #[error("failed to decode page: {0}")]
    Decode(String),

    /// The render was cancelled before it finished.
    #[error("render was cancelled")]
    Cancelled,
}
