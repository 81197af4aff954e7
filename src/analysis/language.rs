//! Script-based language tagging for English/Hindi documents

use serde::{Deserialize, Serialize};

/// Language tag assigned to a text fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Mostly ASCII letters
    En,
    /// Mostly Devanagari letters
    Hi,
    /// Substantial share of both scripts
    Mixed,
    /// No alphabetic characters at all
    Unknown,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
            Language::Mixed => "mixed",
            Language::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

const DEVANAGARI: std::ops::RangeInclusive<char> = '\u{0900}'..='\u{097F}';

/// Classify a fragment by the ratio of Devanagari to ASCII letters
pub fn classify(text: &str) -> Language {
    let mut hindi_chars = 0usize;
    let mut english_chars = 0usize;
    let mut total = 0usize;

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        total += 1;
        if DEVANAGARI.contains(&c) {
            hindi_chars += 1;
        } else if c.is_ascii_alphabetic() {
            english_chars += 1;
        }
    }

    if total == 0 {
        return Language::Unknown;
    }

    let hindi_ratio = hindi_chars as f32 / total as f32;
    let english_ratio = english_chars as f32 / total as f32;

    if hindi_ratio > 0.5 {
        Language::Hi
    } else if english_ratio > 0.5 {
        Language::En
    } else if hindi_ratio > 0.2 && english_ratio > 0.2 {
        Language::Mixed
    } else {
        Language::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_devanagari_only_is_hindi() {
        assert_eq!(classify("भारत सरकार"), Language::Hi);
    }

    #[test]
    fn test_ascii_only_is_english() {
        assert_eq!(classify("GOVERNMENT OF INDIA"), Language::En);
    }

    #[test]
    fn test_no_letters_is_unknown() {
        assert_eq!(classify(""), Language::Unknown);
        assert_eq!(classify("1234 5678 9012"), Language::Unknown);
        assert_eq!(classify("--/--"), Language::Unknown);
    }

    #[test]
    fn test_even_mix_is_mixed() {
        // 4 ASCII, 4 Devanagari, 2 other letters: 40% / 40%
        assert_eq!(classify("ABCD कखगघ éé"), Language::Mixed);
    }

    #[test]
    fn test_other_scripts_default_to_english() {
        assert_eq!(classify("привет"), Language::En);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Hi.to_string(), "hi");
        assert_eq!(serde_json::to_string(&Language::Mixed).unwrap(), "\"mixed\"");
    }
}
