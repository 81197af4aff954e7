//! Text recognition adapter boundary
//!
//! The recognition model is an external capability: it receives a
//! preprocessed image and returns raw detections. Everything downstream
//! (normalization, classification, aggregation) only sees [`Detection`]s.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Axis-aligned bounding box in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest box containing both `self` and `other`
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// One raw OCR hit
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Bounding polygon points, in order
    pub polygon: Vec<(f32, f32)>,
    /// Recognized text as returned by the engine
    pub raw_text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl Detection {
    /// Create a detection, clamping the confidence into [0, 1]
    pub fn new(polygon: Vec<(f32, f32)>, raw_text: impl Into<String>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
        Self {
            polygon,
            raw_text: raw_text.into(),
            confidence,
        }
    }

    /// Create a detection from an axis-aligned box
    pub fn from_bounds(bounds: BoundingBox, raw_text: impl Into<String>, confidence: f32) -> Self {
        let (x, y) = (bounds.x as f32, bounds.y as f32);
        let (right, bottom) = (x + bounds.width as f32, y + bounds.height as f32);
        Self::new(
            vec![(x, y), (right, y), (right, bottom), (x, bottom)],
            raw_text,
            confidence,
        )
    }

    /// Axis-aligned rectangle enclosing the polygon
    pub fn bounding_box(&self) -> BoundingBox {
        polygon_to_bounds(&self.polygon)
    }
}

/// Granularity of detections requested from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrGranularity {
    /// Individual words with their bounding boxes
    #[default]
    Word,
    /// Full lines with their bounding boxes
    Line,
}

/// Options handed to the recognizer on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionOptions {
    /// Language codes to recognize (e.g. "en", "hi")
    pub languages: Vec<String>,
    /// Minimum confidence for a detection to be kept (0.0 - 1.0)
    pub confidence_threshold: f32,
    /// Run the image preprocessor before recognition
    pub preprocess: bool,
    /// Word-level detections when true, line-level otherwise
    pub extract_word_details: bool,
    /// Ask the engine to use hardware acceleration if it has any
    pub use_accelerated_inference: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "hi".to_string()],
            confidence_threshold: 0.5,
            preprocess: true,
            extract_word_details: true,
            use_accelerated_inference: false,
        }
    }
}

impl RecognitionOptions {
    pub fn granularity(&self) -> OcrGranularity {
        if self.extract_word_details {
            OcrGranularity::Word
        } else {
            OcrGranularity::Line
        }
    }
}

/// A text recognition engine
///
/// Implementations hold whatever long-lived model/runtime handle they need;
/// construction is where `RecognitionUnavailable` should surface.
pub trait TextRecognizer: Send + Sync {
    /// Engine name for metadata and capability reports
    fn name(&self) -> &str;

    /// Engine version, if it can be determined
    fn version(&self) -> Result<String>;

    /// Whether hardware acceleration is actually in use
    fn accelerated(&self) -> bool {
        false
    }

    /// Recognize text in the image at `image`, in reading order
    fn recognize(&self, image: &Path, options: &RecognitionOptions) -> Result<Vec<Detection>>;
}

/// Convert polygon points to bounding box
pub fn polygon_to_bounds(polygon: &[(f32, f32)]) -> BoundingBox {
    if polygon.is_empty() {
        return BoundingBox::default();
    }

    let min_x = polygon.iter().map(|p| p.0).fold(f32::INFINITY, f32::min);
    let min_y = polygon.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
    let max_x = polygon.iter().map(|p| p.0).fold(f32::NEG_INFINITY, f32::max);
    let max_y = polygon.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

    BoundingBox::new(
        min_x.max(0.0) as u32,
        min_y.max(0.0) as u32,
        (max_x - min_x) as u32,
        (max_y - min_y) as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_to_bounds() {
        let polygon = vec![(10.0, 20.0), (50.0, 22.0), (48.0, 40.0), (9.0, 38.0)];
        assert_eq!(polygon_to_bounds(&polygon), BoundingBox::new(9, 20, 41, 20));
        assert_eq!(polygon_to_bounds(&[]), BoundingBox::default());
    }

    #[test]
    fn test_detection_from_bounds() {
        let det = Detection::from_bounds(BoundingBox::new(0, 20, 10, 10), "INDIA", 0.6);
        assert_eq!(det.bounding_box(), BoundingBox::new(0, 20, 10, 10));
        assert_eq!(det.polygon.len(), 4);
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Detection::new(vec![], "a", 1.7).confidence, 1.0);
        assert_eq!(Detection::new(vec![], "a", -0.2).confidence, 0.0);
        assert_eq!(Detection::new(vec![], "a", f32::NAN).confidence, 0.0);
    }

    #[test]
    fn test_bounding_box_union() {
        let a = BoundingBox::new(10, 10, 20, 5);
        let b = BoundingBox::new(35, 8, 10, 10);
        assert_eq!(a.union(&b), BoundingBox::new(10, 8, 35, 10));
    }

    #[test]
    fn test_default_options() {
        let options = RecognitionOptions::default();
        assert_eq!(options.languages, vec!["en", "hi"]);
        assert!((options.confidence_threshold - 0.5).abs() < f32::EPSILON);
        assert!(options.preprocess);
        assert_eq!(options.granularity(), OcrGranularity::Word);
    }
}
