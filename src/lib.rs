//! kyc-ocr - Text extraction for scanned KYC identity documents
//!
//! Preprocesses document photos (Aadhaar, PAN, passport), runs them through a
//! text recognition engine and turns the raw detections into normalized,
//! language-tagged word records with detected document-field patterns.

pub mod analysis;
pub mod config;
pub mod error;
pub mod vision;

pub use analysis::{ExtractionResult, Language, WordRecord};
pub use error::ExtractionError;
pub use vision::{DocumentProcessor, RecognitionOptions, TextRecognizer};
