//! OCR backend using the Tesseract command-line engine via rusty-tesseract.
//!
//! Tesseract exposes no incremental progress, so recognition is reported as
//! a `RecognizingText` status at 0.0 before the call and 1.0 after it.

use std::collections::HashMap;

use image::{DynamicImage, RgbaImage};
use once_cell::sync::OnceCell;
use rusty_tesseract::{Args, Image};

use crate::error::{ExtractError, ExtractResult};
use crate::ocr::{OcrEngine, OcrError, OcrInput, OcrPhase, OcrStatus, OcrStatusSink};
use crate::pdf::RasterSurface;

/// Tesseract version detected on first use, shared by the whole process.
static TESSERACT_VERSION: OnceCell<Result<String, String>> = OnceCell::new();

/// Check for a usable tesseract binary once per process.
///
/// Later calls return the cached outcome without probing again.
pub fn initialize() -> ExtractResult<&'static str> {
    let version = TESSERACT_VERSION.get_or_init(|| {
        let version = rusty_tesseract::get_tesseract_version().map_err(|e| e.to_string());
        match &version {
            Ok(v) => tracing::info!("Using tesseract {}", v.lines().next().unwrap_or(v.as_str())),
            Err(e) => tracing::warn!("Tesseract is not available: {}", e),
        }
        version
    });

    version.as_deref().map_err(|e| {
        ExtractError::Configuration(format!(
            "tesseract is not installed or not on PATH: {}",
            e
        ))
    })
}

/// OCR engine backed by the `tesseract` binary.
#[derive(Debug, Clone, Default)]
pub struct TesseractOcr {
    /// Page segmentation mode passed as `--psm`.
    psm: Option<i32>,
    /// Resolution hint passed as `--dpi`.
    dpi: Option<i32>,
}

impl TesseractOcr {
    /// Create a Tesseract engine, verifying the binary is available.
    pub fn new() -> ExtractResult<Self> {
        initialize()?;
        Ok(Self::default())
    }

    /// Set the page segmentation mode.
    pub fn with_psm(mut self, psm: i32) -> Self {
        self.psm = Some(psm);
        self
    }

    /// Set the resolution hint for the input images.
    pub fn with_dpi(mut self, dpi: i32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    fn args(&self, language: &str) -> Args {
        Args {
            lang: language.to_string(),
            config_variables: HashMap::new(),
            dpi: self.dpi,
            psm: self.psm,
            oem: None,
        }
    }

    /// Decode the input into an image Tesseract can read.
    fn load(input: OcrInput<'_>) -> Result<DynamicImage, OcrError> {
        match input {
            OcrInput::Encoded { bytes, media_type } => image::load_from_memory(bytes)
                .map_err(|e| OcrError::UnreadableImage(format!("{}: {}", media_type, e))),
            OcrInput::Surface(surface) => surface_to_image(surface),
        }
    }
}

fn surface_to_image(surface: &RasterSurface) -> Result<DynamicImage, OcrError> {
    RgbaImage::from_raw(surface.width(), surface.height(), surface.pixels().to_vec())
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| {
            OcrError::UnreadableImage(format!(
                "surface {}x{} has an invalid pixel buffer",
                surface.width(),
                surface.height()
            ))
        })
}

impl OcrEngine for TesseractOcr {
    fn recognize(
        &self,
        input: OcrInput<'_>,
        language: &str,
        status: &dyn OcrStatusSink,
    ) -> Result<String, OcrError> {
        status.status(OcrStatus::new(OcrPhase::Initializing, 0.0));
        let image = Self::load(input)?;
        let tess_image = Image::from_dynamic_image(&image)
            .map_err(|e| OcrError::UnreadableImage(e.to_string()))?;
        drop(image);

        status.status(OcrStatus::new(OcrPhase::RecognizingText, 0.0));
        let text = rusty_tesseract::image_to_string(&tess_image, &self.args(language))
            .map_err(|e| OcrError::Engine(e.to_string()))?;
        status.status(OcrStatus::new(OcrPhase::RecognizingText, 1.0));

        Ok(text)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
