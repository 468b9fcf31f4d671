//! Photo pre-processing before OCR.
//!
//! Tesseract performs poorly on small, low-contrast phone photos, so images
//! go through a fixed enhancement chain first: grayscale, auto-contrast
//! stretch, contrast boost, unsharp masking, a light blur to suppress scan
//! noise, binarization, and an upscale when the image is small. Every step is
//! a best-effort heuristic; if anything fails the original bytes are returned
//! unchanged and OCR gets to try its luck on them.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use log::{debug, warn};
use std::io::Cursor;

/// Fixed contrast multiplier applied around the mid-gray point.
pub const CONTRAST_FACTOR: f32 = 2.2;

/// Luminance threshold for binarization.
pub const BINARIZE_THRESHOLD: u8 = 160;

/// Images whose shorter side is below this floor get upscaled.
pub const MIN_DIMENSION: u32 = 1000;

/// Sigma for the unsharp mask.
const SHARPEN_SIGMA: f32 = 1.0;

/// Threshold for the unsharp mask (difference below this is left alone).
const SHARPEN_THRESHOLD: i32 = 2;

/// Sigma for the noise-suppression blur.
const DENOISE_SIGMA: f32 = 0.5;

/// Prepare raw photo bytes for OCR.
///
/// Returns PNG-encoded processed bytes, or the unmodified input when the
/// image cannot be decoded or re-encoded. The chain is fully deterministic:
/// identical input bytes always produce identical output bytes.
pub fn prepare_for_ocr(bytes: &[u8]) -> Vec<u8> {
    match process(bytes) {
        Ok(processed) => processed,
        Err(e) => {
            warn!("Image pre-processing failed, passing original bytes to OCR: {e}");
            bytes.to_vec()
        }
    }
}

fn process(bytes: &[u8]) -> anyhow::Result<Vec<u8>> {
    let image = image::load_from_memory(bytes)?;
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    debug!("Pre-processing image: {width}x{height}");

    let stretched = stretch_contrast(&gray);
    let boosted = boost_contrast(&stretched, CONTRAST_FACTOR);
    let sharpened = imageops::unsharpen(&boosted, SHARPEN_SIGMA, SHARPEN_THRESHOLD);
    let smoothed = imageops::blur(&sharpened, DENOISE_SIGMA);
    let binary = binarize(&smoothed, BINARIZE_THRESHOLD);
    let scaled = upscale_if_small(binary);

    let mut out = Vec::new();
    DynamicImage::ImageLuma8(scaled).write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Png)?;
    Ok(out)
}

/// Linear auto-contrast stretch: maps the observed [min, max] luminance range
/// onto the full [0, 255] range. A flat image is returned as-is.
fn stretch_contrast(image: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for Luma([p]) in image.pixels() {
        min = min.min(*p);
        max = max.max(*p);
    }

    if min >= max {
        return image.clone();
    }

    let range = (max - min) as f32;
    map_pixels(image, |p| ((p as f32 - min as f32) * 255.0 / range).round())
}

/// Multiply contrast around the mid-gray point by a fixed factor.
fn boost_contrast(image: &GrayImage, factor: f32) -> GrayImage {
    map_pixels(image, |p| (p as f32 - 128.0) * factor + 128.0)
}

/// Hard threshold to pure black and white.
fn binarize(image: &GrayImage, threshold: u8) -> GrayImage {
    map_pixels(image, |p| if p >= threshold { 255.0 } else { 0.0 })
}

/// Upscale with Lanczos resampling when the shorter side is below the floor.
/// The integer multiplier is chosen to bring that side above the floor.
fn upscale_if_small(image: GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let shorter = width.min(height);
    if shorter == 0 || shorter >= MIN_DIMENSION {
        return image;
    }

    let factor = MIN_DIMENSION.div_ceil(shorter);
    imageops::resize(
        &image,
        width * factor,
        height * factor,
        FilterType::Lanczos3,
    )
}

fn map_pixels(image: &GrayImage, f: impl Fn(u8) -> f32) -> GrayImage {
    let mut out = image.clone();
    for Luma([p]) in out.pixels_mut() {
        *p = f(*p).clamp(0.0, 255.0) as u8;
    }
    out
}
