//! Result aggregation
//!
//! Turns the ordered detections of one document into a single
//! [`ExtractionResult`]: threshold filtering, per-word normalization and
//! language tagging, overall confidence, and pattern detection over the
//! joined text.

use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;

use super::language::{self, Language};
use super::normalize;
use super::patterns::PatternClassifier;
use crate::vision::ocr::{BoundingBox, Detection};

/// A normalized, classified detection kept in the final result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordRecord {
    /// Cleaned text
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
    pub bounding_box: BoundingBox,
    /// Text consists of digits only
    pub is_numeric: bool,
    /// Text consists of letters only
    pub is_alphabetic: bool,
    pub language: Language,
    /// Confidence fell below the threshold in effect
    pub low_confidence: bool,
}

/// Engine and run details attached to every successful result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineMetadata {
    pub engine: String,
    pub languages: Vec<String>,
    pub accelerated_inference: bool,
    pub confidence_threshold: f32,
    pub preprocessing_enabled: bool,
    /// Detections returned by the engine
    pub total_detections: usize,
    /// Detections that made it into `word_records`
    pub valid_detections: usize,
}

/// Structured output of one extraction call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub extracted_text: String,
    /// Mean confidence of the kept words, 0.0 when there are none
    pub overall_confidence: f32,
    pub word_count: usize,
    pub character_count: usize,
    pub word_records: Vec<WordRecord>,
    pub detected_languages: BTreeSet<Language>,
    pub detected_patterns: BTreeSet<String>,
    /// Wall-clock time in seconds
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_metadata: Option<EngineMetadata>,
}

impl ExtractionResult {
    /// Failure-shaped result carrying the error description and elapsed time
    pub fn failure(error: impl ToString, elapsed: Duration) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            processing_time: elapsed.as_secs_f64(),
            ..Default::default()
        }
    }

    pub fn with_processing_time(mut self, elapsed: Duration) -> Self {
        self.processing_time = elapsed.as_secs_f64();
        self
    }

    pub fn with_metadata(mut self, metadata: EngineMetadata) -> Self {
        self.engine_metadata = Some(metadata);
        self
    }
}

/// Builds extraction results from raw detections
#[derive(Debug, Clone)]
pub struct Aggregator {
    threshold: f32,
    classifier: PatternClassifier,
}

impl Aggregator {
    pub fn new(threshold: f32) -> Self {
        Self::with_classifier(threshold, PatternClassifier::default())
    }

    pub fn with_classifier(threshold: f32, classifier: PatternClassifier) -> Self {
        Self { threshold, classifier }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Build a word record, or `None` if the detection is below the
    /// threshold, has no usable confidence, or cleans down to nothing
    pub fn word_record(&self, detection: &Detection) -> Option<WordRecord> {
        if !detection.confidence.is_finite() || detection.confidence < self.threshold {
            return None;
        }

        let text = normalize::clean(&detection.raw_text);
        if text.is_empty() {
            return None;
        }

        Some(WordRecord {
            is_numeric: text.chars().all(char::is_numeric),
            is_alphabetic: text.chars().all(char::is_alphabetic),
            language: language::classify(&text),
            confidence: detection.confidence.clamp(0.0, 1.0),
            bounding_box: detection.bounding_box(),
            low_confidence: detection.confidence < self.threshold,
            text,
        })
    }

    /// Aggregate detections, in order, into a successful result
    pub fn aggregate(&self, detections: &[Detection]) -> ExtractionResult {
        let word_records: Vec<WordRecord> = detections
            .iter()
            .filter_map(|detection| self.word_record(detection))
            .collect();

        let mut extracted_text = String::new();
        for record in &word_records {
            extracted_text.push_str(&record.text);
            extracted_text.push(' ');
        }
        let extracted_text = extracted_text.trim().to_string();

        let overall_confidence = if word_records.is_empty() {
            0.0
        } else {
            let total: f32 = word_records.iter().map(|r| r.confidence).sum();
            (total / word_records.len() as f32).clamp(0.0, 1.0)
        };

        let detected_languages = word_records.iter().map(|r| r.language).collect();
        let detected_patterns = self.classifier.detect(&extracted_text);

        ExtractionResult {
            success: true,
            error: None,
            word_count: word_records.len(),
            character_count: extracted_text.chars().count(),
            extracted_text,
            overall_confidence,
            word_records,
            detected_languages,
            detected_patterns,
            processing_time: 0.0,
            engine_metadata: None,
        }
    }
}
