//! Error types for the extraction pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Failures that can occur while extracting text from a document image
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The input path does not resolve to a file
    #[error("Image file not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    /// The file exists but its bytes cannot be decoded as an image
    #[error("Could not read image {}: {}", .path.display(), .source)]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The recognition engine could not be initialized (missing runtime or model)
    #[error("Text recognition unavailable: {0}")]
    RecognitionUnavailable(String),

    /// The recognition engine errored on a valid input
    #[error("Text recognition failed: {0}")]
    RecognitionFailure(String),

    /// The preprocessed image could not be written to a temporary file
    #[error("Failed to write preprocessed image: {0}")]
    TempArtifact(String),
}

pub type Result<T> = std::result::Result<T, ExtractionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ExtractionError::ImageNotFound(PathBuf::from("/tmp/missing.png"));
        assert_eq!(err.to_string(), "Image file not found: /tmp/missing.png");

        let err = ExtractionError::RecognitionUnavailable("tesseract not installed".to_string());
        assert!(err.to_string().contains("tesseract not installed"));
    }
}
