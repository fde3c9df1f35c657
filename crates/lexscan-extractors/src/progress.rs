//! Progress reporting.
//!
//! Callers receive a single fraction in [0, 1] through a [`ProgressSink`].
//! OCR engines report phase-tagged status through [`OcrStatusSink`]; the
//! engine keeps only the text-recognition phase, maps it into the page's
//! share of the document, and never lets the reported value go backwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::ocr::{OcrPhase, OcrStatus, OcrStatusSink};

/// Receives overall extraction progress as a fraction in [0, 1].
///
/// Calls are fire-and-forget: implementations should return quickly and
/// must not block on the consumer.
pub trait ProgressSink: Send + Sync {
    /// Report the fraction of OCR work completed.
    fn report(&self, fraction: f64);
}

impl<F> ProgressSink for F
where
    F: Fn(f64) + Send + Sync,
{
    fn report(&self, fraction: f64) {
        self(fraction)
    }
}

impl ProgressSink for tokio::sync::mpsc::UnboundedSender<f64> {
    fn report(&self, fraction: f64) {
        // A dropped receiver only means nobody is watching anymore.
        let _ = self.send(fraction);
    }
}

/// Per-call progress state shared by every page of one extraction.
pub(crate) struct ProgressReporter {
    sink: Option<Arc<dyn ProgressSink>>,
    /// Bits of the last reported fraction.
    last: AtomicU64,
}

impl ProgressReporter {
    pub(crate) fn new(sink: Option<Arc<dyn ProgressSink>>) -> Self {
        Self {
            sink,
            last: AtomicU64::new(0f64.to_bits()),
        }
    }

    /// Forward a fraction to the sink, clamped to [0, 1].
    ///
    /// Values below the last reported one are dropped.
    pub(crate) fn emit(&self, fraction: f64) {
        let Some(sink) = &self.sink else {
            return;
        };
        if fraction.is_nan() {
            return;
        }
        let value = fraction.clamp(0.0, 1.0);

        let advanced = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                (value >= f64::from_bits(bits)).then_some(value.to_bits())
            })
            .is_ok();

        if advanced {
            sink.report(value);
        }
    }

    /// Status sink for recognizing page `page` (1-indexed) of `page_count`.
    pub(crate) fn for_page(&self, page: usize, page_count: usize) -> PageProgress<'_> {
        PageProgress {
            reporter: self,
            offset: page.saturating_sub(1) as f64,
            page_count: page_count.max(1) as f64,
        }
    }

    /// Status sink for a whole image, which counts as a single page.
    pub(crate) fn for_image(&self) -> PageProgress<'_> {
        self.for_page(1, 1)
    }
}

/// Maps one OCR pass's progress into its page range `[(p-1)/N, p/N]`.
pub(crate) struct PageProgress<'a> {
    reporter: &'a ProgressReporter,
    offset: f64,
    page_count: f64,
}

impl OcrStatusSink for PageProgress<'_> {
    fn status(&self, status: OcrStatus) {
        if status.phase != OcrPhase::RecognizingText || status.progress.is_nan() {
            return;
        }
        let page_fraction = f64::from(status.progress).clamp(0.0, 1.0);
        self.reporter
            .emit((page_fraction + self.offset) / self.page_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (Arc<Mutex<Vec<f64>>>, Arc<dyn ProgressSink>) {
        let values = Arc::new(Mutex::new(Vec::new()));
        let sink_values = values.clone();
        let sink: Arc<dyn ProgressSink> =
            Arc::new(move |fraction: f64| sink_values.lock().unwrap().push(fraction));
        (values, sink)
    }

    fn recognizing(progress: f32) -> OcrStatus {
        OcrStatus::new(OcrPhase::RecognizingText, progress)
    }

    #[test]
    fn test_page_mapping() {
        let (values, sink) = recording();
        let reporter = ProgressReporter::new(Some(sink));
        let page = reporter.for_page(2, 4);

        page.status(recognizing(0.0));
        page.status(recognizing(0.5));
        page.status(recognizing(1.0));

        assert_eq!(*values.lock().unwrap(), vec![0.25, 0.375, 0.5]);
    }

    #[test]
    fn test_other_phases_are_suppressed() {
        let (values, sink) = recording();
        let reporter = ProgressReporter::new(Some(sink));
        let page = reporter.for_image();

        page.status(OcrStatus::new(OcrPhase::LoadingCore, 1.0));
        page.status(OcrStatus::new(OcrPhase::LoadingLanguage, 0.7));
        page.status(recognizing(0.3));
        page.status(OcrStatus::new(OcrPhase::InitializingApi, 1.0));

        assert_eq!(*values.lock().unwrap(), vec![0.3_f32 as f64]);
    }

    #[test]
    fn test_values_are_clamped_and_non_decreasing() {
        let (values, sink) = recording();
        let reporter = ProgressReporter::new(Some(sink));

        reporter.emit(-0.5);
        reporter.emit(0.4);
        reporter.emit(0.2);
        reporter.emit(f64::NAN);
        reporter.emit(0.4);
        reporter.emit(7.0);

        assert_eq!(*values.lock().unwrap(), vec![0.0, 0.4, 0.4, 1.0]);
    }

    #[test]
    fn test_without_sink_is_silent() {
        let reporter = ProgressReporter::new(None);
        reporter.for_page(1, 1).status(recognizing(0.5));
        reporter.emit(0.9);
    }

    #[test]
    fn test_channel_sink() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let reporter = ProgressReporter::new(Some(Arc::new(tx)));
        reporter.for_page(1, 2).status(recognizing(1.0));

        assert_eq!(rx.try_recv().unwrap(), 0.5);
        assert!(rx.try_recv().is_err());
    }
}
