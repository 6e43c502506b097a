//! Core types for the render session

/// A run of text sharing one baseline, in reading order
#[derive(Clone, Debug, PartialEq)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// Left edge X coordinate in scaled page coordinates
    pub x: f32,
    /// Baseline Y coordinate in scaled page coordinates
    pub y: f32,
}

/// Raw rendered page image.
///
/// Tightly packed RGB pixel data (3 bytes per pixel) plus dimensions.
/// This is the interchange format between the render engine and the
/// caller-owned surface.
#[derive(Clone, PartialEq)]
pub struct ImageData {
    /// Raw RGB pixel data (3 bytes per pixel: R, G, B)
    pub pixels: Vec<u8>,
    /// Image width in pixels
    pub width_px: u32,
    /// Image height in pixels
    pub height_px: u32,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("width_px", &self.width_px)
            .field("height_px", &self.height_px)
            .field("pixels_len", &self.pixels.len())
            .finish()
    }
}

/// Complete result of rendering one page at one scale
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedPage {
    /// Rendered image data
    pub image: ImageData,
    /// Text fragments in source stream order
    pub fragments: Vec<TextFragment>,
}

/// Document metadata reported by the engine on open
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentInfo {
    /// Total page count
    pub page_count: u32,
    /// Document title, if the document carries one
    pub title: Option<String>,
}

/// A page/scale pair a render is aimed at
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderTarget {
    /// Page number (1-indexed)
    pub page: u32,
    /// Scale factor (1.0 = 100%)
    pub scale: f32,
}

/// Caller-owned raster target the session paints into.
///
/// Mutated only from a render-completion handler whose generation matches
/// the current session.
pub trait Surface {
    /// Resize the target to the given pixel dimensions
    fn prepare(&mut self, width_px: u32, height_px: u32);

    /// Paint a rendered page into the target
    fn paint(&mut self, image: &ImageData);

    /// Blank the target
    fn clear(&mut self);
}
