//! Extraction engine.
//!
//! Routes a [`SourceFile`] by declared media type:
//! - images are recognized as a whole by the OCR engine;
//! - PDFs are read page by page, using the embedded text layer when it has
//!   any non-whitespace content and rendering the page for OCR otherwise.
//!
//! Pages run strictly in order, one at a time. Any page failure aborts the
//! whole call so a document is never silently truncated.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, ExtractResult};
use crate::ocr::{OcrEngine, OcrInput};
use crate::pdf::{join_fragments, PdfDecoder, PdfDocument};
use crate::progress::{ProgressReporter, ProgressSink};
use crate::types::{ExtractionResult, MediaKind, PageStrategy, SourceFile};
use crate::Extractor;

/// Separator placed between page texts.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Turns images and PDFs into text using pluggable OCR and PDF backends.
///
/// Cheap to clone; clones share the same backends. Concurrent calls on
/// different files are independent.
#[derive(Clone)]
pub struct ExtractionEngine {
    config: Arc<ExtractionConfig>,
    ocr: Arc<dyn OcrEngine>,
    pdf: Arc<dyn PdfDecoder>,
}

impl ExtractionEngine {
    /// Create an engine from a validated configuration and its collaborators.
    pub fn new(
        config: ExtractionConfig,
        ocr: Arc<dyn OcrEngine>,
        pdf: Arc<dyn PdfDecoder>,
    ) -> ExtractResult<Self> {
        config.validate()?;
        tracing::debug!(
            "Extraction engine ready (ocr: {}, pdf: {}, language: {}, scale: {})",
            ocr.name(),
            pdf.name(),
            config.recognition_language,
            config.render_scale
        );
        Ok(Self {
            config: Arc::new(config),
            ocr,
            pdf,
        })
    }

    /// Extract text from `file`, reporting OCR progress to `progress`.
    ///
    /// Runs on tokio's blocking pool. Unsupported media types are rejected
    /// before any work is scheduled.
    pub async fn extract(
        &self,
        file: SourceFile,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> ExtractResult<ExtractionResult> {
        self.extract_with_cancel(file, progress, CancellationToken::new())
            .await
    }

    /// Like [`extract`](Self::extract), stopping early once `cancel` fires.
    ///
    /// Cancellation is checked before the document is opened, before each
    /// page and before each OCR call. Dropping the returned future also
    /// cancels the background work.
    pub async fn extract_with_cancel(
        &self,
        file: SourceFile,
        progress: Option<Arc<dyn ProgressSink>>,
        cancel: CancellationToken,
    ) -> ExtractResult<ExtractionResult> {
        let kind = file.kind()?;
        let engine = self.clone();

        let task_token = cancel.child_token();
        let guard = task_token.clone().drop_guard();

        let result = tokio::task::spawn_blocking(move || {
            engine.run(kind, &file, progress, &task_token)
        })
        .await;

        guard.disarm();
        result?
    }

    /// Synchronous extraction, for callers already off the async runtime.
    pub fn extract_blocking(
        &self,
        file: &SourceFile,
        progress: Option<Arc<dyn ProgressSink>>,
        cancel: &CancellationToken,
    ) -> ExtractResult<ExtractionResult> {
        let kind = file.kind()?;
        self.run(kind, file, progress, cancel)
    }

    fn run(
        &self,
        kind: MediaKind,
        file: &SourceFile,
        progress: Option<Arc<dyn ProgressSink>>,
        cancel: &CancellationToken,
    ) -> ExtractResult<ExtractionResult> {
        let reporter = ProgressReporter::new(progress);

        let result = match kind {
            MediaKind::Image => self.extract_image(file, &reporter, cancel),
            MediaKind::Pdf => self.extract_pdf(file.bytes(), &reporter, cancel),
        };

        match &result {
            Ok(extracted) => tracing::info!(
                "Extracted {} characters from {} ({} pages, {} via OCR)",
                extracted.text.len(),
                file.media_type(),
                extracted.page_count(),
                extracted.ocr_page_count()
            ),
            Err(e) => tracing::warn!("Extraction from {} failed: {}", file.media_type(), e),
        }

        result
    }

    fn extract_image(
        &self,
        file: &SourceFile,
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> ExtractResult<ExtractionResult> {
        check_cancelled(cancel)?;

        let input = OcrInput::Encoded {
            bytes: file.bytes(),
            media_type: file.media_type(),
        };
        let text = self
            .ocr
            .recognize(input, &self.config.recognition_language, &reporter.for_image())
            .map_err(|e| ExtractError::Recognition {
                page: None,
                message: e.to_string(),
            })?;

        Ok(ExtractionResult {
            text,
            pages: vec![PageStrategy::Ocr],
        })
    }

    fn extract_pdf(
        &self,
        bytes: &[u8],
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> ExtractResult<ExtractionResult> {
        check_cancelled(cancel)?;

        let document = self
            .pdf
            .open(bytes)
            .map_err(|e| ExtractError::Decode(e.to_string()))?;
        let page_count = document.page_count();
        tracing::debug!("Opened PDF with {} pages via {}", page_count, self.pdf.name());

        let mut texts = Vec::with_capacity(page_count);
        let mut pages = Vec::with_capacity(page_count);

        for number in 1..=page_count {
            check_cancelled(cancel)?;
            let (text, strategy) =
                self.extract_page(&*document, number, page_count, reporter, cancel)?;
            texts.push(text);
            pages.push(strategy);
        }

        Ok(ExtractionResult {
            text: texts.join(PAGE_SEPARATOR),
            pages,
        })
    }

    fn extract_page(
        &self,
        document: &dyn PdfDocument,
        number: usize,
        page_count: usize,
        reporter: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> ExtractResult<(String, PageStrategy)> {
        let page = document
            .page(number)
            .map_err(|e| ExtractError::Decode(format!("page {}: {}", number, e)))?;

        let fragments = page
            .text_fragments()
            .map_err(|e| ExtractError::Decode(format!("page {}: {}", number, e)))?;
        let text = join_fragments(&fragments);

        // Any non-whitespace text layer wins, however sparse.
        if !text.trim().is_empty() {
            tracing::debug!(
                "Page {}/{}: text layer ({} characters)",
                number,
                page_count,
                text.len()
            );
            return Ok((text, PageStrategy::TextLayer));
        }

        tracing::debug!("Page {}/{}: no text layer, running OCR", number, page_count);

        let surface = page
            .render(self.config.render_scale)
            .map_err(|e| ExtractError::Render {
                page: number,
                message: e.to_string(),
            })?;

        check_cancelled(cancel)?;

        let text = self
            .ocr
            .recognize(
                OcrInput::Surface(&surface),
                &self.config.recognition_language,
                &reporter.for_page(number, page_count),
            )
            .map_err(|e| ExtractError::Recognition {
                page: Some(number),
                message: e.to_string(),
            })?;

        Ok((text, PageStrategy::Ocr))
    }
}

fn check_cancelled(cancel: &CancellationToken) -> ExtractResult<()> {
    if cancel.is_cancelled() {
        Err(ExtractError::Cancelled)
    } else {
        Ok(())
    }
}

#[async_trait]
impl Extractor for ExtractionEngine {
    async fn extract(
        &self,
        file: SourceFile,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> ExtractResult<ExtractionResult> {
        ExtractionEngine::extract(self, file, progress).await
    }

    fn supports(&self, media_type: &str) -> bool {
        MediaKind::classify(media_type).is_some()
    }

    fn name(&self) -> &str {
        "lexscan"
    }
}

impl std::fmt::Debug for ExtractionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionEngine")
            .field("config", &self.config)
            .field("ocr", &self.ocr.name())
            .field("pdf", &self.pdf.name())
            .finish()
    }
}
