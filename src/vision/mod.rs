//! Vision/OCR Layer
//!
//! Runs the per-document extraction flow: image validation, preprocessing to
//! a temporary artifact, text recognition and aggregation. Supports any
//! recognition backend implementing [`TextRecognizer`]:
//! - Tesseract command-line engine (default)

pub mod deskew;
pub mod ocr;
pub mod preprocess;
pub mod tesseract;

pub use ocr::{BoundingBox, Detection, OcrGranularity, RecognitionOptions, TextRecognizer};
pub use preprocess::{PreprocessedImage, PreprocessingConfig, ThresholdMethod};
pub use tesseract::TesseractOcr;

use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use crate::analysis::{Aggregator, EngineMetadata, ExtractionResult, PatternClassifier};
use crate::error::{ExtractionError, Result};

/// Image file extensions accepted as input
pub const SUPPORTED_FORMATS: &[&str] = &[".jpg", ".jpeg", ".png", ".bmp", ".tiff"];

/// Feature flags reported by [`DocumentProcessor::capabilities`]
#[derive(Debug, Clone, Serialize)]
pub struct FeatureFlags {
    pub word_details: bool,
    pub confidence_scores: bool,
    pub multiple_languages: bool,
    pub preprocessing: bool,
}

/// What the configured engine can do
#[derive(Debug, Clone, Serialize)]
pub struct Capabilities {
    pub engine: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub supported_languages: Vec<String>,
    pub accelerated: bool,
    pub features: FeatureFlags,
    pub supported_formats: Vec<String>,
}

/// Health report for the configured engine
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub success: bool,
    pub status: String,
    pub message: String,
    pub languages: Vec<String>,
    pub accelerated: bool,
}

/// Document text extraction pipeline.
///
/// Owns one recognizer for its whole lifetime and borrows it for every call;
/// calls share no other state, so one processor can serve many documents.
pub struct DocumentProcessor {
    recognizer: Box<dyn TextRecognizer>,
    options: RecognitionOptions,
    preprocessing: PreprocessingConfig,
    classifier: PatternClassifier,
}

impl DocumentProcessor {
    /// Create a processor backed by the Tesseract engine at `command`
    pub fn tesseract(command: &Path, options: RecognitionOptions) -> Result<Self> {
        let engine = TesseractOcr::new(command)?;
        Ok(Self::new(Box::new(engine), options))
    }

    pub fn new(recognizer: Box<dyn TextRecognizer>, options: RecognitionOptions) -> Self {
        info!(
            "Document processor using {} with languages: {:?}",
            recognizer.name(),
            options.languages
        );
        Self {
            recognizer,
            options,
            preprocessing: PreprocessingConfig::default(),
            classifier: PatternClassifier::default(),
        }
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    pub fn with_classifier(mut self, classifier: PatternClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn options(&self) -> &RecognitionOptions {
        &self.options
    }

    /// Extract text with the processor's default options
    pub fn process(&self, image_path: &Path) -> ExtractionResult {
        self.process_with_options(image_path, &self.options)
    }

    /// Extract text from one image. Never fails: errors become a result with
    /// `success == false`.
    pub fn process_with_options(&self, image_path: &Path, options: &RecognitionOptions) -> ExtractionResult {
        let start = Instant::now();

        match self.run(image_path, options) {
            Ok(result) => {
                let elapsed = start.elapsed();
                info!(
                    "Extraction completed in {:.2}s: {} words, confidence {:.2}",
                    elapsed.as_secs_f64(),
                    result.word_count,
                    result.overall_confidence
                );
                result.with_processing_time(elapsed)
            }
            Err(e) => {
                warn!("Extraction failed for {}: {}", image_path.display(), e);
                ExtractionResult::failure(e, start.elapsed())
            }
        }
    }

    fn run(&self, image_path: &Path, options: &RecognitionOptions) -> Result<ExtractionResult> {
        if !image_path.exists() {
            return Err(ExtractionError::ImageNotFound(image_path.to_path_buf()));
        }

        // Dropping the artifact after recognition removes the temporary file
        let artifact = if options.preprocess {
            match preprocess::preprocess_to_temp(image_path, &self.preprocessing) {
                Ok(artifact) => Some(artifact),
                Err(e) => {
                    warn!("Preprocessing failed, using original image: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let recognized_path = artifact.as_ref().map_or(image_path, |a| a.path());
        info!("Processing image: {}", recognized_path.display());
        let detections = self.recognizer.recognize(recognized_path, options)?;
        drop(artifact);

        let aggregator = Aggregator::with_classifier(options.confidence_threshold, self.classifier.clone());
        let result = aggregator.aggregate(&detections);

        let metadata = EngineMetadata {
            engine: self.recognizer.name().to_string(),
            languages: options.languages.clone(),
            accelerated_inference: options.use_accelerated_inference,
            confidence_threshold: options.confidence_threshold,
            preprocessing_enabled: options.preprocess,
            total_detections: detections.len(),
            valid_detections: result.word_records.len(),
        };

        Ok(result.with_metadata(metadata))
    }

    /// Describe the engine and the pipeline's features
    pub fn capabilities(&self) -> Capabilities {
        let (available, version, error) = match self.recognizer.version() {
            Ok(version) => (true, Some(version), None),
            Err(e) => (false, None, Some(e.to_string())),
        };

        Capabilities {
            engine: self.recognizer.name().to_string(),
            available,
            version,
            error,
            supported_languages: self.options.languages.clone(),
            accelerated: self.recognizer.accelerated(),
            features: FeatureFlags {
                word_details: true,
                confidence_scores: true,
                multiple_languages: true,
                preprocessing: true,
            },
            supported_formats: SUPPORTED_FORMATS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            success: true,
            status: "healthy".to_string(),
            message: format!("{} is available and ready", self.recognizer.name()),
            languages: self.options.languages.clone(),
            accelerated: self.recognizer.accelerated(),
        }
    }
}
