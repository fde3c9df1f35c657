//! OCR engine abstraction.
//!
//! The engine never depends on a particular OCR library. Backends implement
//! [`OcrEngine`] and report phase-tagged status; the extraction engine
//! decides which phases reach the caller.

use thiserror::Error;

use crate::pdf::RasterSurface;

/// Stage an OCR engine is in while it works.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrPhase {
    /// Loading the engine itself.
    LoadingCore,
    /// Starting an engine instance.
    Initializing,
    /// Loading trained data for the recognition language.
    LoadingLanguage,
    /// Configuring the recognizer.
    InitializingApi,
    /// Recognizing text. The only phase surfaced as extraction progress.
    RecognizingText,
    /// Any other backend-specific stage.
    Other(String),
}

/// A status update from an OCR engine.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrStatus {
    /// Current phase.
    pub phase: OcrPhase,
    /// Progress within the phase, nominally in [0, 1].
    pub progress: f32,
}

impl OcrStatus {
    /// Create a status update.
    pub fn new(phase: OcrPhase, progress: f32) -> Self {
        Self { phase, progress }
    }
}

/// Receives status updates from an OCR engine during one recognition call.
pub trait OcrStatusSink: Send + Sync {
    /// Handle a status update.
    fn status(&self, status: OcrStatus);
}

/// What an OCR engine is asked to read.
#[derive(Debug, Clone, Copy)]
pub enum OcrInput<'a> {
    /// An encoded image file (PNG, JPEG, ...).
    Encoded {
        /// Encoded file bytes.
        bytes: &'a [u8],
        /// Declared media type of the bytes.
        media_type: &'a str,
    },
    /// A rendered PDF page.
    Surface(&'a RasterSurface),
}

/// Errors reported by OCR backends.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Input could not be decoded into an image.
    #[error("Unreadable image: {0}")]
    UnreadableImage(String),

    /// The OCR engine itself is unavailable or failed.
    #[error("OCR engine error: {0}")]
    Engine(String),
}

/// Optical character recognition capability.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in `input` using `language`.
    ///
    /// Blocking. Implementations report progress through `status` and
    /// return the recognized text without post-processing.
    fn recognize(
        &self,
        input: OcrInput<'_>,
        language: &str,
        status: &dyn OcrStatusSink,
    ) -> Result<String, OcrError>;

    /// Human-readable name for this engine.
    fn name(&self) -> &str;
}
