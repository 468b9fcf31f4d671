//! OCR configuration.
//!
//! The bot recognizes mixed Latin and Cyrillic text, so Tesseract is loaded
//! with both language packs. The minimum-length threshold below which an
//! extraction counts as a failure is a single explicit constant here.

/// Combined Latin + Cyrillic recognition.
pub const DEFAULT_LANGUAGES: &str = "rus+eng";

/// Tesseract page segmentation mode 6: assume a single uniform block of text.
pub const DEFAULT_PAGE_SEG_MODE: u32 = 6;

/// Extractions shorter than this many characters are treated as a failure.
pub const MIN_EXTRACTED_CHARS: usize = 10;

/// Reject image payloads above this size before decoding.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for OCR processing.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// OCR language codes (e.g. "rus+eng").
    pub languages: String,
    /// Fixed page segmentation mode passed to Tesseract.
    pub page_seg_mode: u32,
    /// Minimum number of characters for a successful extraction.
    pub min_extracted_chars: usize,
    /// Maximum allowed image payload in bytes.
    pub max_image_bytes: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            page_seg_mode: DEFAULT_PAGE_SEG_MODE,
            min_extracted_chars: MIN_EXTRACTED_CHARS,
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OcrConfig::default();
        assert_eq!(config.languages, "rus+eng");
        assert_eq!(config.min_extracted_chars, MIN_EXTRACTED_CHARS);
        assert!(config.max_image_bytes >= 1024 * 1024);
    }
}
