//! Text extraction from photos using Tesseract OCR.
//!
//! Recognition is CPU-bound, so the actual Tesseract call runs on the
//! blocking thread pool and never stalls the dispatch path. Raw output is
//! whitespace-normalized; results below the configured minimum length are
//! reported as [`OcrError::TooShort`] so the caller can ask for a better
//! photo instead of searching for garbage.

use lazy_static::lazy_static;
use log::info;
use regex::Regex;

use crate::instance_manager::OcrInstanceManager;
use crate::ocr_config::OcrConfig;
use crate::ocr_errors::OcrError;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("whitespace regex is valid");
}

/// Extract cleaned text from image bytes.
pub async fn extract_text_from_image(
    bytes: Vec<u8>,
    config: &OcrConfig,
    manager: &OcrInstanceManager,
) -> Result<String, OcrError> {
    validate_image(&bytes, config)?;

    let instance = manager
        .get_instance(config)
        .map_err(|e| OcrError::Initialization(e.to_string()))?;

    let raw = tokio::task::spawn_blocking(move || {
        let mut tess = instance.lock().unwrap();
        tess.set_image_from_mem(&bytes)
            .map_err(|e| OcrError::ImageLoad(e.to_string()))?;
        tess.get_utf8_text()
            .map_err(|e| OcrError::Extraction(e.to_string()))
    })
    .await
    .map_err(|e| OcrError::Extraction(format!("OCR task panicked: {e}")))??;

    let cleaned = clean_text(&raw);
    let found = check_extracted_length(&cleaned, config.min_extracted_chars)?;

    info!("OCR extraction completed: {found} characters");
    Ok(cleaned)
}

/// Reject cleaned extractions below the minimum length. Returns the
/// character count on success.
fn check_extracted_length(cleaned: &str, minimum: usize) -> Result<usize, OcrError> {
    let found = cleaned.chars().count();
    if found < minimum {
        return Err(OcrError::TooShort { found, minimum });
    }
    Ok(found)
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn clean_text(raw: &str) -> String {
    WHITESPACE.replace_all(raw, " ").trim().to_string()
}

/// Check size and magic bytes before handing the payload to Tesseract.
/// Tesseract via Leptonica accepts PNG, JPEG, BMP and TIFF.
pub fn validate_image(bytes: &[u8], config: &OcrConfig) -> Result<(), OcrError> {
    if bytes.len() > config.max_image_bytes {
        return Err(OcrError::Validation(format!(
            "image is {} bytes, limit is {}",
            bytes.len(),
            config.max_image_bytes
        )));
    }

    match image::guess_format(bytes) {
        Ok(
            image::ImageFormat::Png
            | image::ImageFormat::Jpeg
            | image::ImageFormat::Bmp
            | image::ImageFormat::Tiff,
        ) => Ok(()),
        Ok(format) => Err(OcrError::Validation(format!(
            "unsupported image format: {format:?}"
        ))),
        Err(_) => Err(OcrError::Validation(
            "could not determine image format".to_string(),
        )),
    }
}
