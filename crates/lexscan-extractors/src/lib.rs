//! lexscan-extractors - Text extraction from uploaded images and PDFs.
//!
//! PDF pages are read from their embedded text layer when they have one and
//! rendered for OCR when they don't; images go straight to OCR. Progress is
//! reported as a single fraction in [0, 1] that only moves during OCR.
//!
//! # Features
//!
//! - `pdfium` - PDF decoding and page rendering via pdfium-render
//!   (requires the Pdfium library at runtime)
//! - `tesseract` - OCR via tesseract (requires tesseract installed)
//! - `full` - All backends
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lexscan_extractors::{ExtractionConfig, ExtractorFactory, SourceFile};
//!
//! let engine = ExtractorFactory::engine(ExtractionConfig::default(), None)?;
//! let file = SourceFile::new(pdf_bytes, "application/pdf");
//! let progress = Arc::new(|fraction: f64| println!("{:.0}%", fraction * 100.0));
//! let result = engine.extract(file, Some(progress)).await?;
//! println!("{}", result.text);
//! ```

mod config;
mod engine;
mod error;
mod factory;
mod ocr;
mod pdf;
mod progress;
mod types;

#[cfg(feature = "pdfium")]
pub mod pdfium;

#[cfg(feature = "tesseract")]
pub mod tesseract;

pub use config::{ExtractionConfig, DEFAULT_LANGUAGE, DEFAULT_RENDER_SCALE, MAX_RENDER_SCALE};
pub use engine::{ExtractionEngine, PAGE_SEPARATOR};
pub use error::{ExtractError, ExtractResult};
pub use factory::ExtractorFactory;
pub use ocr::{OcrEngine, OcrError, OcrInput, OcrPhase, OcrStatus, OcrStatusSink};
pub use pdf::{join_fragments, PdfDecoder, PdfDocument, PdfError, PdfPage, RasterSurface};
pub use progress::ProgressSink;
pub use types::{ExtractionResult, MediaKind, PageStrategy, SourceFile, PDF_MEDIA_TYPE};

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumDecoder;

#[cfg(feature = "tesseract")]
pub use tesseract::TesseractOcr;

pub use tokio_util::sync::CancellationToken;

use std::sync::Arc;

use async_trait::async_trait;

/// Core Extractor trait - turns an uploaded file into text.
///
/// Consumers such as the summarization step hold an `Arc<dyn Extractor>`
/// and never see the OCR or PDF backends behind it.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract text from a file, optionally reporting progress.
    async fn extract(
        &self,
        file: SourceFile,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> ExtractResult<ExtractionResult>;

    /// Check if this extractor handles the given media type.
    fn supports(&self, media_type: &str) -> bool;

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}
