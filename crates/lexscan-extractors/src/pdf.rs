//! PDF decoder abstraction.
//!
//! A decoder opens a document from bytes and hands out pages one at a time.
//! Every handle is an owned value; backends release native resources when
//! the handle is dropped, so the engine's early returns never leak.

use thiserror::Error;

/// Errors reported by PDF backends.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Document or page could not be parsed.
    #[error("{0}")]
    Decode(String),

    /// Page could not be rendered.
    #[error("{0}")]
    Render(String),

    /// Requested page does not exist.
    #[error("page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },
}

/// An in-memory RGBA8 pixel buffer produced by rendering a page.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// Wrap RGBA8 pixels, row-major, 4 bytes per pixel.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, PdfError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(PdfError::Render(format!(
                "surface {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Opens PDF documents.
pub trait PdfDecoder: Send + Sync {
    /// Parse a document from bytes.
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PdfDocument + 'a>, PdfError>;

    /// Human-readable name for this decoder.
    fn name(&self) -> &str;
}

/// An open PDF document.
pub trait PdfDocument {
    /// Total number of pages.
    fn page_count(&self) -> usize;

    /// Load a page by 1-indexed number.
    fn page(&self, number: usize) -> Result<Box<dyn PdfPage + '_>, PdfError>;
}

/// A loaded PDF page.
pub trait PdfPage {
    /// Text fragments of the embedded text layer, in content order.
    fn text_fragments(&self) -> Result<Vec<String>, PdfError>;

    /// Render the page at `scale` times its natural size.
    fn render(&self, scale: f32) -> Result<RasterSurface, PdfError>;
}

/// Join text-layer fragments the way a page's text is assembled.
pub fn join_fragments(fragments: &[String]) -> String {
    fragments.join(" ")
}
