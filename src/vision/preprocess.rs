//! Image preprocessing for document OCR
//!
//! Turns a raw document photo into a clean, binarized, upright image:
//! grayscale, denoise, threshold, morphological cleanup, upscaling of
//! small scans and deskew, always in that order.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use imageproc::contrast::{adaptive_threshold, otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, open};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::deskew;
use crate::error::{ExtractionError, Result};

/// Smallest upscaling factor worth applying
const MIN_UPSCALE_FACTOR: f32 = 1.5;

/// Binarization method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMethod {
    /// Local mean threshold, robust to uneven lighting
    #[default]
    Adaptive,
    /// Single global threshold chosen by Otsu's method
    Otsu,
}

/// Preprocessing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Gaussian blur sigma for denoising (0 disables)
    pub blur_sigma: f32,
    /// Binarization method
    pub threshold: ThresholdMethod,
    /// Block radius for adaptive thresholding (block is 2r+1 pixels wide)
    pub adaptive_block_radius: u32,
    /// Close then open with a 3x3 element to remove speckle
    pub morphology: bool,
    /// Upscale images whose shorter side is below `min_legible_size`
    pub upscale: bool,
    /// Shorter-side size (pixels) under which glyphs are considered too small
    pub min_legible_size: u32,
    /// Upscaling factor (values below 1.5 are raised to 1.5)
    pub upscale_factor: f32,
    /// Estimate and correct rotation
    pub deskew: bool,
    /// Skew angles (degrees) at or below this are left alone
    pub deskew_tolerance: f32,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1, // roughly a 5x5 kernel
            threshold: ThresholdMethod::Adaptive,
            adaptive_block_radius: 5,
            morphology: true,
            upscale: true,
            min_legible_size: 800,
            upscale_factor: 2.0,
            deskew: true,
            deskew_tolerance: 0.1,
        }
    }
}

/// Run the full preprocessing pipeline on a decoded image.
/// The input is never modified.
pub fn preprocess(image: &DynamicImage, config: &PreprocessingConfig) -> GrayImage {
    let start = Instant::now();

    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray;
    }

    let denoised = if config.blur_sigma > 0.0 {
        gaussian_blur_f32(&gray, config.blur_sigma)
    } else {
        gray
    };

    let mut processed = binarize(&denoised, config);

    if config.morphology {
        processed = close(&processed, Norm::LInf, 1);
        processed = open(&processed, Norm::LInf, 1);
    }

    if config.upscale {
        processed = upscale_if_small(processed, config);
    }

    if config.deskew {
        let (straightened, _) = deskew::deskew(&processed, config.deskew_tolerance);
        processed = straightened;
    }

    debug!(
        "Preprocessed {}x{} -> {}x{} in {:?}",
        width,
        height,
        processed.width(),
        processed.height(),
        start.elapsed()
    );

    processed
}

/// Binarize to dark text (0) on a light background (255)
fn binarize(image: &GrayImage, config: &PreprocessingConfig) -> GrayImage {
    match config.threshold {
        ThresholdMethod::Adaptive => adaptive_threshold(image, config.adaptive_block_radius.max(1)),
        ThresholdMethod::Otsu => {
            let level = otsu_level(image);
            debug!("Otsu threshold level: {}", level);
            threshold(image, level, ThresholdType::Binary)
        }
    }
}

fn upscale_if_small(image: GrayImage, config: &PreprocessingConfig) -> GrayImage {
    let (width, height) = image.dimensions();
    if width.min(height) >= config.min_legible_size {
        return image;
    }

    let factor = config.upscale_factor.max(MIN_UPSCALE_FACTOR);
    let new_width = (width as f32 * factor).round() as u32;
    let new_height = (height as f32 * factor).round() as u32;
    debug!(
        "Upscaling small image from {}x{} by {}x",
        width, height, factor
    );

    image::imageops::resize(&image, new_width, new_height, FilterType::CatmullRom)
}

/// Decode an image file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(ExtractionError::ImageNotFound(path.to_path_buf()));
    }
    image::open(path).map_err(|source| ExtractionError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode and preprocess an image file
pub fn preprocess_file(path: &Path, config: &PreprocessingConfig) -> Result<GrayImage> {
    let image = load_image(path)?;
    Ok(preprocess(&image, config))
}

/// Preprocessed image persisted as a uniquely named temporary PNG.
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct PreprocessedImage {
    file: NamedTempFile,
    pub width: u32,
    pub height: u32,
}

impl PreprocessedImage {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Decode, preprocess and write the result to a temporary file
pub fn preprocess_to_temp(path: &Path, config: &PreprocessingConfig) -> Result<PreprocessedImage> {
    let processed = preprocess_file(path, config)?;

    let file = tempfile::Builder::new()
        .prefix("kyc-ocr-")
        .suffix(".png")
        .tempfile()
        .map_err(|e| ExtractionError::TempArtifact(e.to_string()))?;

    processed
        .save_with_format(file.path(), ImageFormat::Png)
        .map_err(|e| ExtractionError::TempArtifact(e.to_string()))?;

    info!("Image preprocessed: {}", file.path().display());

    Ok(PreprocessedImage {
        file,
        width: processed.width(),
        height: processed.height(),
    })
}
