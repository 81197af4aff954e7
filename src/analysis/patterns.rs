//! Document field pattern detection
//!
//! Heuristic, table-driven detection of Indian identity-document fields
//! (Aadhaar, PAN, passport numbers, dates, phone numbers, PIN codes).
//! Every rule is evaluated independently against the same text, so one
//! document may match any number of rules.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// Default rule table as (name, regex) pairs
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    ("aadhaar_number", r"\b\d{4}\s?\d{4}\s?\d{4}\b"),
    ("pan_number", r"\b[A-Z]{5}\d{4}[A-Z]\b"),
    ("passport_number", r"\b[A-Z]\d{7}\b"),
    ("date", r"\b\d{1,2}[/-]\d{1,2}[/-]\d{4}\b"),
    ("phone_number", r"\b\d{10}\b"),
    ("pin_code", r"\b\d{6}\b"),
    ("government_document", r"(?i)government|india|भारत|सरकार"),
];

static DEFAULT_CLASSIFIER: Lazy<PatternClassifier> = Lazy::new(|| {
    PatternClassifier::new(DEFAULT_RULES).expect("Invalid default document pattern table")
});

/// A named field pattern
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Name reported when the pattern matches
    pub name: String,
    regex: Regex,
}

impl PatternRule {
    pub fn new(name: &str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            regex: Regex::new(pattern)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Classifier over a table of named patterns
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    rules: Vec<PatternRule>,
}

impl PatternClassifier {
    /// Compile a classifier from (name, regex) pairs
    pub fn new(rules: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(name, pattern)| PatternRule::new(name, pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Append a rule to the table
    pub fn with_rule(mut self, rule: PatternRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Names of all rules matching anywhere in `text`
    pub fn detect(&self, text: &str) -> BTreeSet<String> {
        self.rules
            .iter()
            .filter(|rule| rule.is_match(text))
            .map(|rule| rule.name.clone())
            .collect()
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        DEFAULT_CLASSIFIER.clone()
    }
}

/// Detect document patterns using the default rule table
pub fn detect_patterns(text: &str) -> BTreeSet<String> {
    DEFAULT_CLASSIFIER.detect(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_aadhaar_with_spaces() {
        let found = detect_patterns("1234 5678 9012");
        assert!(found.contains("aadhaar_number"));
        assert!(!found.contains("pin_code"));
        assert!(!found.contains("phone_number"));
    }

    #[test]
    fn test_aadhaar_without_spaces() {
        let found = detect_patterns("Aadhaar: 123456789012");
        assert!(found.contains("aadhaar_number"));
        // 12 digits is neither a phone number nor a PIN code
        assert!(!found.contains("phone_number"));
        assert!(!found.contains("pin_code"));
    }

    #[test]
    fn test_pan_only() {
        assert_eq!(names(&detect_patterns("ABCDE1234F")), vec!["pan_number"]);
    }

    #[test]
    fn test_passport() {
        let found = detect_patterns("Passport No. J8369854");
        assert!(found.contains("passport_number"));
    }

    #[test]
    fn test_dates() {
        assert!(detect_patterns("DOB: 01/02/1990").contains("date"));
        assert!(detect_patterns("DOB: 1-12-1990").contains("date"));
        assert!(!detect_patterns("DOB: 1990").contains("date"));
    }

    #[test]
    fn test_phone_and_pin() {
        let found = detect_patterns("Mobile 9876543210 PIN 110001");
        assert!(found.contains("phone_number"));
        assert!(found.contains("pin_code"));
    }

    #[test]
    fn test_government_keywords() {
        assert!(detect_patterns("Government of India").contains("government_document"));
        assert!(detect_patterns("INCOME TAX DEPARTMENT GOVT. OF INDIA").contains("government_document"));
        assert!(detect_patterns("भारत सरकार").contains("government_document"));
        assert!(!detect_patterns("Private Limited").contains("government_document"));
    }

    #[test]
    fn test_no_patterns() {
        assert!(detect_patterns("").is_empty());
        assert!(detect_patterns("hello world").is_empty());
    }

    #[test]
    fn test_duplicates_reported_once() {
        let found = detect_patterns("110001 560034 400001");
        assert_eq!(names(&found), vec!["pin_code"]);
    }

    #[test]
    fn test_custom_rule() {
        let classifier = PatternClassifier::new(&[("voter_id", r"\b[A-Z]{3}\d{7}\b")])
            .unwrap()
            .with_rule(PatternRule::new("pin_code", r"\b\d{6}\b").unwrap());
        assert_eq!(classifier.rules().len(), 2);

        let found = classifier.detect("EPIC ABC1234567 PIN 110001");
        assert_eq!(names(&found), vec!["pin_code", "voter_id"]);
    }

    #[test]
    fn test_invalid_rule_is_rejected() {
        assert!(PatternClassifier::new(&[("broken", r"(\d{4}")]).is_err());
    }
}
