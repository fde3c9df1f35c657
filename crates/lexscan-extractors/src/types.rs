//! Core types for text extraction.

use serde::{Deserialize, Serialize};

use crate::error::{ExtractError, ExtractResult};

/// MIME type of PDF documents.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Kind of input the engine knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Any raster image (`image/*`), recognized as a whole.
    Image,
    /// PDF document, processed page by page.
    Pdf,
}

impl MediaKind {
    /// Classify a declared media type.
    ///
    /// Matching ignores case and MIME parameters, so
    /// `Application/PDF; charset=binary` is still a PDF.
    pub fn classify(media_type: &str) -> Option<Self> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == PDF_MEDIA_TYPE {
            return Some(MediaKind::Pdf);
        }

        match essence.strip_prefix("image/") {
            Some(subtype) if !subtype.is_empty() => Some(MediaKind::Image),
            _ => None,
        }
    }
}

/// A file handed to the engine: raw bytes plus the media type the caller declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    bytes: Vec<u8>,
    media_type: String,
}

impl SourceFile {
    /// Wrap bytes with their declared media type.
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }

    /// Raw file content.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Media type as declared by the caller.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Classify the declared media type, rejecting anything that is not an image or PDF.
    pub fn kind(&self) -> ExtractResult<MediaKind> {
        MediaKind::classify(&self.media_type)
            .ok_or_else(|| ExtractError::UnsupportedMediaType(self.media_type.clone()))
    }

    /// Size of the file in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the file has no content.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// How the text of a page was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStrategy {
    /// Embedded text layer, no OCR.
    TextLayer,
    /// Rendered (or whole-image) OCR.
    Ocr,
}

/// Text extracted from a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Page texts in page order, joined by a blank line. Image text is verbatim.
    pub text: String,

    /// Strategy used for each page, in page order. Images have one entry.
    pub pages: Vec<PageStrategy>,
}

impl ExtractionResult {
    /// Number of pages (or 1 for an image).
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of pages that needed OCR.
    pub fn ocr_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|strategy| **strategy == PageStrategy::Ocr)
            .count()
    }

    /// Check if extraction produced meaningful content.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
