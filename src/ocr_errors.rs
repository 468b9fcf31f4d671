//! Error types for the OCR seam.
//!
//! Handlers map each variant to a localized user-facing message; everything
//! except `TooShort` also gets logged with the underlying cause.

/// Errors produced while turning a photo into a query string.
#[derive(Debug, Clone)]
pub enum OcrError {
    /// Image payload rejected before OCR (size, format).
    Validation(String),
    /// Tesseract instance could not be created.
    Initialization(String),
    /// Image bytes could not be loaded into Tesseract.
    ImageLoad(String),
    /// Text extraction itself failed.
    Extraction(String),
    /// Extraction succeeded but the cleaned text is below the minimum length.
    TooShort { found: usize, minimum: usize },
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::Validation(msg) => write!(f, "Validation error: {msg}"),
            OcrError::Initialization(msg) => write!(f, "Initialization error: {msg}"),
            OcrError::ImageLoad(msg) => write!(f, "Image load error: {msg}"),
            OcrError::Extraction(msg) => write!(f, "Extraction error: {msg}"),
            OcrError::TooShort { found, minimum } => {
                write!(f, "Extracted text too short: {found} chars (minimum {minimum})")
            }
        }
    }
}

impl std::error::Error for OcrError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = OcrError::Validation("file too large".to_string());
        assert_eq!(e.to_string(), "Validation error: file too large");

        let e = OcrError::TooShort {
            found: 3,
            minimum: 10,
        };
        assert!(e.to_string().contains("3 chars"));
        assert!(e.to_string().contains("minimum 10"));
    }
}
