//! OCR text normalization
//!
//! Removes common recognition artifacts from raw OCR strings while keeping
//! numeric identifiers (Aadhaar, PIN codes, phone numbers) intact.

/// Clean a raw OCR string.
///
/// Rules, in order:
/// 1. collapse whitespace runs and trim
/// 2. `|` becomes `I`
/// 3. `0` becomes `O` only when both neighbours exist and are not digits,
///    then a stray lowercase `l` between letters of an uppercase word becomes `I`
/// 4. curly quotes become straight quotes
pub fn clean(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return collapsed;
    }

    let substituted = collapsed.replace('|', "I");
    let substituted = replace_flanked_zeros(&substituted);
    let substituted = fix_lowercase_l(&substituted);

    normalize_quotes(&substituted)
}

/// Replace `l` with `I` inside words that are otherwise all uppercase ("lNDIA" -> "INDIA").
/// An `l` next to a digit or punctuation is left alone.
fn fix_lowercase_l(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let has_upper = word.chars().any(|c| c.is_uppercase());
            let other_lower = word.chars().any(|c| c.is_lowercase() && c != 'l');
            if word.contains('l') && has_upper && !other_lower {
                replace_letter_flanked_l(word)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn replace_letter_flanked_l(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let before = i.checked_sub(1).map(|j| chars[j]);
            let after = chars.get(i + 1).copied();
            let flanked_by_letters = [before, after]
                .iter()
                .flatten()
                .all(|n| n.is_alphabetic());
            if c == 'l' && flanked_by_letters {
                'I'
            } else {
                c
            }
        })
        .collect()
}

/// Replace `0` with `O` when flanked on both sides by non-digit characters.
/// Neighbours are read from the input, so replacements never cascade.
fn replace_flanked_zeros(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if c != '0' || i == 0 || i + 1 == chars.len() {
                return c;
            }
            let before = chars[i - 1];
            let after = chars[i + 1];
            if !before.is_numeric() && !after.is_numeric() {
                'O'
            } else {
                c
            }
        })
        .collect()
}

fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}
