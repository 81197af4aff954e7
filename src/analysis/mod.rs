//! Text Analysis Layer
//!
//! Post-processing of raw OCR output: normalization, language tagging,
//! document pattern detection and result aggregation.

pub mod aggregate;
pub mod language;
pub mod normalize;
pub mod patterns;

pub use aggregate::{Aggregator, EngineMetadata, ExtractionResult, WordRecord};
pub use language::Language;
pub use patterns::{detect_patterns, PatternClassifier, PatternRule};
