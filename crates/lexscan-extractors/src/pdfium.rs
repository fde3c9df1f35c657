//! PDF backend using Pdfium via pdfium-render.
//!
//! The Pdfium library is bound once per process; every decoder shares that
//! binding. Documents and pages are closed by pdfium-render when dropped.

use std::path::Path;

use once_cell::sync::OnceCell;
use pdfium_render::prelude::{
    PdfDocument as NativeDocument, PdfPage as NativePage, PdfRenderConfig, Pdfium,
};

use crate::error::{ExtractError, ExtractResult};
use crate::pdf::{PdfDecoder, PdfDocument, PdfError, PdfPage, RasterSurface};

static PDFIUM: OnceCell<Pdfium> = OnceCell::new();

/// Bind the Pdfium library for this process.
///
/// Looks in `library_dir` first (when given), then falls back to the system
/// library. Only the first successful call binds; later calls reuse it and
/// ignore `library_dir`.
pub fn initialize(library_dir: Option<&Path>) -> ExtractResult<&'static Pdfium> {
    PDFIUM.get_or_try_init(|| {
        let bindings = match library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                    .or_else(|_| Pdfium::bind_to_system_library())
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| {
            ExtractError::Configuration(format!("cannot load the Pdfium library: {}", e))
        })?;

        tracing::info!("Bound Pdfium library");
        Ok(Pdfium::new(bindings))
    })
}

/// PDF decoder backed by Pdfium.
pub struct PdfiumDecoder {
    pdfium: &'static Pdfium,
}

impl PdfiumDecoder {
    /// Create a decoder, preferring a Pdfium library in `library_dir`.
    pub fn with_library_dir(library_dir: Option<&Path>) -> ExtractResult<Self> {
        Ok(Self {
            pdfium: initialize(library_dir)?,
        })
    }
}

impl std::fmt::Debug for PdfiumDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfiumDecoder").finish_non_exhaustive()
    }
}

impl PdfDecoder for PdfiumDecoder {
    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PdfDocument + 'a>, PdfError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| PdfError::Decode(e.to_string()))?;
        Ok(Box::new(PdfiumDocument { document }))
    }

    fn name(&self) -> &str {
        "pdfium"
    }
}

struct PdfiumDocument<'a> {
    document: NativeDocument<'a>,
}

impl PdfDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page(&self, number: usize) -> Result<Box<dyn PdfPage + '_>, PdfError> {
        let page_count = self.page_count();
        if number == 0 || number > page_count {
            return Err(PdfError::PageOutOfRange {
                page: number,
                page_count,
            });
        }

        // page_count fits in u16, so the index does too.
        let page = self
            .document
            .pages()
            .get((number - 1) as u16)
            .map_err(|e| PdfError::Decode(e.to_string()))?;
        Ok(Box::new(PdfiumPage { page }))
    }
}

struct PdfiumPage<'a> {
    page: NativePage<'a>,
}

impl PdfPage for PdfiumPage<'_> {
    fn text_fragments(&self) -> Result<Vec<String>, PdfError> {
        let text = self
            .page
            .text()
            .map_err(|e| PdfError::Decode(e.to_string()))?;
        let all = text.all();
        Ok(all.lines().map(str::to_string).collect())
    }

    fn render(&self, scale: f32) -> Result<RasterSurface, PdfError> {
        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = self
            .page
            .render_with_config(&config)
            .map_err(|e| PdfError::Render(e.to_string()))?;

        let image = bitmap.as_image().to_rgba8();
        let (width, height) = (image.width(), image.height());
        RasterSurface::from_rgba(width, height, image.into_raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_decoder_is_shareable() {
        assert_send_sync::<PdfiumDecoder>();
        assert_send_sync::<Pdfium>();
    }

    #[test]
    fn test_missing_library_dir_is_not_fatal() {
        // Either the system library binds or the failure is a configuration error.
        match PdfiumDecoder::with_library_dir(Some(Path::new("/nonexistent/pdfium"))) {
            Ok(decoder) => assert_eq!(decoder.name(), "pdfium"),
            Err(e) => assert!(matches!(e, ExtractError::Configuration(_))),
        }
    }
}
