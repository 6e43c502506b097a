//! Render worker - runs in a separate thread behind the engine channel

use std::path::Path;
use std::sync::{Arc, Mutex};

use flume::{Receiver, Sender};
use mupdf::text_page::TextBlockType;
use mupdf::{Colorspace, Document, Matrix, Page, Pixmap, TextPageFlags};

use super::cache::{CacheKey, PageCache};
use super::request::{EngineRequest, EngineResponse, OpenError, RenderError};
use super::types::{DocumentInfo, ImageData, RenderedPage, TextFragment};

/// Worker loop: consume engine requests, answer on the response channel.
///
/// Holds at most one open document at a time; a new `Open` replaces it and
/// flushes the render cache.
pub fn render_worker(
    requests: &Receiver<EngineRequest>,
    responses: &Sender<EngineResponse>,
    cache: &Arc<Mutex<PageCache>>,
) {
    let mut document: Option<(Document, u32)> = None;

    for request in requests.iter() {
        match request {
            EngineRequest::Open { generation, url } => {
                cache
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .invalidate_all();

                match open_document(&url) {
                    Ok((doc, info)) => {
                        document = Some((doc, info.page_count));
                        let _ = responses.send(EngineResponse::Opened { generation, info });
                    }
                    Err(error) => {
                        document = None;
                        log::warn!("open failed for {url}: {error}");
                        let _ = responses.send(EngineResponse::OpenFailed { generation, error });
                    }
                }
            }

            EngineRequest::Render {
                generation,
                page,
                scale,
            } => {
                let Some((doc, page_count)) = document.as_ref() else {
                    let _ = responses.send(EngineResponse::RenderFailed {
                        generation,
                        page,
                        scale,
                        error: RenderError::Cancelled,
                    });
                    continue;
                };

                let key = CacheKey::new(page, scale);
                let cached = cache
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .get(&key);
                if let Some(data) = cached {
                    let _ = responses.send(EngineResponse::Rendered {
                        generation,
                        page,
                        scale,
                        data,
                    });
                    continue;
                }

                match render_page(doc, *page_count, page, scale) {
                    Ok(data) => {
                        let data = cache
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner)
                            .insert(key, data);
                        let _ = responses.send(EngineResponse::Rendered {
                            generation,
                            page,
                            scale,
                            data,
                        });
                    }
                    Err(error) => {
                        log::warn!("render failed for page {page} at {scale:.2}x: {error}");
                        let _ = responses.send(EngineResponse::RenderFailed {
                            generation,
                            page,
                            scale,
                            error,
                        });
                    }
                }
            }

            EngineRequest::Shutdown => break,
        }
    }
}

fn open_document(url: &str) -> Result<(Document, DocumentInfo), OpenError> {
    // Remote documents are the host's job to stage locally first
    if url.starts_with("http://") || url.starts_with("https://") {
        return Err(OpenError::Network(format!(
            "remote document must be staged locally: {url}"
        )));
    }

    if !Path::new(url).exists() {
        return Err(OpenError::NotFound(url.to_string()));
    }

    let doc = Document::open(url).map_err(|e| OpenError::Unreadable(e.to_string()))?;
    let page_count = doc
        .page_count()
        .map_err(|e| OpenError::Unreadable(e.to_string()))? as u32;

    let title = doc
        .metadata(mupdf::MetadataName::Title)
        .ok()
        .filter(|t| !t.is_empty());

    Ok((doc, DocumentInfo { page_count, title }))
}

/// Rasterize one page at the given scale and extract its text fragments
pub fn render_page(
    doc: &Document,
    page_count: u32,
    page_num: u32,
    scale: f32,
) -> Result<RenderedPage, RenderError> {
    if page_num < 1 || page_num > page_count {
        return Err(RenderError::PageOutOfRange {
            page: page_num,
            page_count,
        });
    }

    let page = doc
        .load_page(page_num as i32 - 1)
        .map_err(|e| RenderError::Decode(e.to_string()))?;

    let transform = Matrix::new_scale(scale, scale);
    let rgb = Colorspace::device_rgb();
    let pixmap = page
        .to_pixmap(&transform, &rgb, false, false)
        .map_err(|e| RenderError::Decode(e.to_string()))?;

    let pixels = pixmap_to_rgb(&pixmap)?;
    let fragments = extract_fragments(&page, scale);

    Ok(RenderedPage {
        image: ImageData {
            pixels,
            width_px: pixmap.width(),
            height_px: pixmap.height(),
        },
        fragments,
    })
}

/// Copy pixmap samples into tightly packed RGB, dropping alpha and row
/// padding
fn pixmap_to_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(RenderError::Decode(format!(
            "unsupported pixmap format: {n} channels"
        )));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(RenderError::Decode("pixmap buffer size mismatch".to_string()));
    }

    let mut out = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        if n == 3 {
            out.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                out.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(out)
}

/// One fragment per text line, positioned at the first character's origin
/// scaled into output coordinates
fn extract_fragments(page: &Page, scale: f32) -> Vec<TextFragment> {
    page.to_text_page(TextPageFlags::empty())
        .map(|text_page| {
            let mut fragments = Vec::new();

            for block in text_page.blocks() {
                if block.r#type() != TextBlockType::Text {
                    continue;
                }

                for line in block.lines() {
                    let chars: Vec<_> = line.chars().collect();
                    let Some(first) = chars.first() else {
                        continue;
                    };

                    let origin = first.origin();
                    let mut text = String::new();
                    for ch in &chars {
                        if let Some(c) = ch.char() {
                            text.push(c);
                        }
                    }

                    if !text.is_empty() {
                        fragments.push(TextFragment {
                            text,
                            x: origin.x * scale,
                            y: origin.y * scale,
                        });
                    }
                }
            }

            fragments
        })
        .unwrap_or_default()
}
