//! Tesseract OCR backend
//!
//! Drives the `tesseract` command-line engine and parses its TSV output into
//! detections. Tesseract reports word boxes with a 0-100 confidence; line
//! results are assembled from the words of each line.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use super::ocr::{BoundingBox, Detection, OcrGranularity, RecognitionOptions, TextRecognizer};
use crate::error::{ExtractionError, Result};

/// TSV row level for individual words
const WORD_LEVEL: u32 = 5;

/// Tesseract engine wrapper
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: PathBuf,
    version: String,
}

impl TesseractOcr {
    /// Locate the engine and read its version; fails with
    /// `RecognitionUnavailable` if it cannot be run
    pub fn new(command: impl Into<PathBuf>) -> Result<Self> {
        let command = command.into();
        info!("Initializing Tesseract OCR using {}", command.display());

        let output = Command::new(&command).arg("--version").output().map_err(|e| {
            ExtractionError::RecognitionUnavailable(format!("cannot run {}: {}", command.display(), e))
        })?;

        if !output.status.success() {
            return Err(ExtractionError::RecognitionUnavailable(format!(
                "{} --version exited with {}",
                command.display(),
                output.status
            )));
        }

        // Older releases print the banner on stderr
        let banner = if output.stdout.is_empty() { output.stderr } else { output.stdout };
        let version = String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("unknown")
            .to_string();

        info!("Tesseract OCR initialized successfully (version {})", version);

        Ok(Self { command, version })
    }
}

impl TextRecognizer for TesseractOcr {
    fn name(&self) -> &str {
        "Tesseract"
    }

    fn version(&self) -> Result<String> {
        Ok(self.version.clone())
    }

    fn recognize(&self, image: &Path, options: &RecognitionOptions) -> Result<Vec<Detection>> {
        if options.use_accelerated_inference {
            warn!("Tesseract has no accelerated inference, running on CPU");
        }

        let languages = tesseract_languages(&options.languages);
        debug!("Tesseract: processing {} with languages {}", image.display(), languages);

        let output = Command::new(&self.command)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&languages)
            .arg("tsv")
            .output()
            .map_err(|e| ExtractionError::RecognitionFailure(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::RecognitionFailure(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let detections = parse_tsv(&String::from_utf8_lossy(&output.stdout), options.granularity());
        debug!("Tesseract: found {} text regions", detections.len());
        Ok(detections)
    }
}

/// Map ISO 639-1 codes to Tesseract traineddata names ("en+hi" -> "eng+hin")
fn tesseract_languages(codes: &[String]) -> String {
    if codes.is_empty() {
        return "eng".to_string();
    }
    codes
        .iter()
        .map(|code| match code.as_str() {
            "en" => "eng",
            "hi" => "hin",
            "mr" => "mar",
            "bn" => "ben",
            "ta" => "tam",
            "te" => "tel",
            other => other,
        })
        .collect::<Vec<_>>()
        .join("+")
}

/// One word row from the TSV output
#[derive(Debug)]
struct TsvWord {
    line_key: (u32, u32, u32, u32),
    bounds: BoundingBox,
    confidence: f32,
    text: String,
}

fn parse_word(row: &str) -> Option<TsvWord> {
    let fields: Vec<&str> = row.split('\t').collect();
    if fields.len() < 12 {
        return None;
    }

    let num = |i: usize| fields[i].trim().parse::<u32>().ok();
    if num(0)? != WORD_LEVEL {
        return None;
    }

    let confidence: f32 = fields[10].trim().parse().ok()?;
    let text = fields[11..].join("\t");
    if confidence < 0.0 || text.trim().is_empty() {
        return None;
    }

    Some(TsvWord {
        line_key: (num(1)?, num(2)?, num(3)?, num(4)?),
        bounds: BoundingBox::new(num(6)?, num(7)?, num(8)?, num(9)?),
        confidence: confidence / 100.0,
        text,
    })
}

/// Parse `tesseract ... tsv` output into detections in reading order
pub fn parse_tsv(tsv: &str, granularity: OcrGranularity) -> Vec<Detection> {
    let words: Vec<TsvWord> = tsv.lines().skip(1).filter_map(parse_word).collect();

    match granularity {
        OcrGranularity::Word => words
            .into_iter()
            .map(|w| Detection::from_bounds(w.bounds, w.text, w.confidence))
            .collect(),
        OcrGranularity::Line => {
            let mut lines: Vec<(TsvWord, usize)> = Vec::new();
            for word in words {
                let same_line = lines
                    .last()
                    .is_some_and(|(line, _)| line.line_key == word.line_key);
                match lines.last_mut() {
                    Some((line, count)) if same_line => {
                        line.bounds = line.bounds.union(&word.bounds);
                        line.confidence += word.confidence;
                        line.text.push(' ');
                        line.text.push_str(&word.text);
                        *count += 1;
                    }
                    _ => lines.push((word, 1)),
                }
            }
            lines
                .into_iter()
                .map(|(line, count)| {
                    Detection::from_bounds(line.bounds, line.text, line.confidence / count as f32)
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
2\t1\t1\t0\t0\t0\t20\t10\t400\t60\t-1\t
4\t1\t1\t1\t1\t0\t20\t10\t300\t25\t-1\t
5\t1\t1\t1\t1\t1\t20\t10\t120\t25\t96.5\tGOVERNMENT
5\t1\t1\t1\t1\t2\t150\t12\t30\t22\t91\tOF
5\t1\t1\t1\t1\t3\t190\t10\t130\t25\t88\tINDIA
4\t1\t1\t1\t2\t0\t20\t45\t260\t25\t-1\t
5\t1\t1\t1\t2\t1\t20\t45\t260\t25\t42.25\t1234
5\t1\t1\t1\t2\t2\t290\t45\t10\t25\t-1\t
";

    #[test]
    fn test_parse_words() {
        let detections = parse_tsv(SAMPLE, OcrGranularity::Word);
        let texts: Vec<_> = detections.iter().map(|d| d.raw_text.as_str()).collect();
        assert_eq!(texts, vec!["GOVERNMENT", "OF", "INDIA", "1234"]);

        assert!((detections[0].confidence - 0.965).abs() < 1e-6);
        assert_eq!(detections[1].bounding_box(), BoundingBox::new(150, 12, 30, 22));
    }

    #[test]
    fn test_parse_lines() {
        let detections = parse_tsv(SAMPLE, OcrGranularity::Line);
        assert_eq!(detections.len(), 2);

        assert_eq!(detections[0].raw_text, "GOVERNMENT OF INDIA");
        assert_eq!(detections[0].bounding_box(), BoundingBox::new(20, 10, 300, 25));
        let expected = (0.965 + 0.91 + 0.88) / 3.0;
        assert!((detections[0].confidence - expected).abs() < 1e-5);

        assert_eq!(detections[1].raw_text, "1234");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_tsv("", OcrGranularity::Word).is_empty());
        assert!(parse_tsv("header\nnot\ta\trow", OcrGranularity::Word).is_empty());
    }

    #[test]
    fn test_language_mapping() {
        let codes = vec!["en".to_string(), "hi".to_string()];
        assert_eq!(tesseract_languages(&codes), "eng+hin");
        assert_eq!(tesseract_languages(&[]), "eng");
        assert_eq!(tesseract_languages(&["deu".to_string()]), "deu");
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let err = TesseractOcr::new("/nonexistent/bin/tesseract").unwrap_err();
        assert!(matches!(err, ExtractionError::RecognitionUnavailable(_)));
    }
}
