//! Factory for creating extraction engines.

use std::sync::Arc;

use crate::config::ExtractionConfig;
use crate::engine::ExtractionEngine;
use crate::error::ExtractResult;
use crate::ocr::OcrEngine;
use crate::pdf::PdfDecoder;
use crate::Extractor;

#[cfg(feature = "pdfium")]
use crate::pdfium::PdfiumDecoder;

#[cfg(feature = "tesseract")]
use crate::tesseract::TesseractOcr;

/// Factory for creating extraction engines and their backends.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create an extractor from explicit backends.
    pub fn with_backends(
        config: ExtractionConfig,
        ocr: Arc<dyn OcrEngine>,
        pdf: Arc<dyn PdfDecoder>,
    ) -> ExtractResult<Arc<dyn Extractor>> {
        Ok(Arc::new(ExtractionEngine::new(config, ocr, pdf)?))
    }

    /// Create a Tesseract OCR backend.
    #[cfg(feature = "tesseract")]
    pub fn tesseract() -> ExtractResult<Arc<dyn OcrEngine>> {
        Ok(Arc::new(TesseractOcr::new()?))
    }

    /// Create a Pdfium PDF backend, preferring a library in `library_dir`.
    #[cfg(feature = "pdfium")]
    pub fn pdfium(library_dir: Option<&std::path::Path>) -> ExtractResult<Arc<dyn PdfDecoder>> {
        Ok(Arc::new(PdfiumDecoder::with_library_dir(library_dir)?))
    }

    /// Create an engine using Tesseract for OCR and Pdfium for PDFs.
    #[cfg(all(feature = "tesseract", feature = "pdfium"))]
    pub fn engine(
        config: ExtractionConfig,
        pdfium_library_dir: Option<&std::path::Path>,
    ) -> ExtractResult<ExtractionEngine> {
        ExtractionEngine::new(config, Self::tesseract()?, Self::pdfium(pdfium_library_dir)?)
    }
}
