//! Extraction error types.

use thiserror::Error;

/// Errors that can occur during text extraction.
///
/// Everything except [`ExtractError::UnsupportedMediaType`] and
/// [`ExtractError::Configuration`] is an extraction failure: the file was
/// accepted but could not be turned into text. A failed call never carries
/// partial text.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Declared media type is neither an image nor a PDF.
    #[error("Unsupported media type: {0}. Please upload an image or PDF")]
    UnsupportedMediaType(String),

    /// File could not be opened or parsed as its declared type.
    #[error("Could not decode document: {0}")]
    Decode(String),

    /// A page could not be rendered to a raster surface.
    #[error("Could not render page {page}: {message}")]
    Render { page: usize, message: String },

    /// The OCR engine failed. `page` is `None` for whole-image input.
    #[error("{}", recognition_message(.page, .message))]
    Recognition { page: Option<usize>, message: String },

    /// Extraction was cancelled before it completed.
    #[error("Extraction cancelled")]
    Cancelled,

    /// Invalid extraction configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Task join error from spawn_blocking.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

fn recognition_message(page: &Option<usize>, message: &str) -> String {
    match page {
        Some(page) => format!("Text recognition failed on page {}: {}", page, message),
        None => format!("Text recognition failed: {}", message),
    }
}

impl ExtractError {
    /// Whether this error happened after the file was accepted for extraction.
    pub fn is_extraction_failure(&self) -> bool {
        !matches!(
            self,
            ExtractError::UnsupportedMediaType(_) | ExtractError::Configuration(_)
        )
    }

    /// Whether this error is a cancellation rather than a processing fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExtractError::Cancelled)
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        assert!(!ExtractError::UnsupportedMediaType("text/plain".into()).is_extraction_failure());
        assert!(!ExtractError::Configuration("bad".into()).is_extraction_failure());
        assert!(ExtractError::Decode("corrupt".into()).is_extraction_failure());
        assert!(ExtractError::Cancelled.is_extraction_failure());
        assert!(ExtractError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_recognition_messages() {
        let page = ExtractError::Recognition {
            page: Some(3),
            message: "engine crashed".into(),
        };
        assert_eq!(
            page.to_string(),
            "Text recognition failed on page 3: engine crashed"
        );

        let image = ExtractError::Recognition {
            page: None,
            message: "engine crashed".into(),
        };
        assert_eq!(image.to_string(), "Text recognition failed: engine crashed");
    }
}
