//! Script-aware text helpers.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Letters, digits, and the zero-width non-joiner used in legacy Kurdish spellings.
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}\p{M}\u{200C}]+").expect("valid word regex");
}

/// Arabic, Arabic Supplement and the presentation forms.
pub fn is_arabic_script(c: char) -> bool {
    matches!(c as u32,
        0x0600..=0x06FF | 0x0750..=0x077F | 0xFB50..=0xFDFF | 0xFE70..=0xFEFF)
}

/// Latin letters including the extended ranges Kurmanji uses (ê, î, û, ş, ç).
pub fn is_latin_letter(c: char) -> bool {
    c.is_alphabetic() && (c as u32) < 0x0250
}

/// Lowercased word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().trim_matches('\u{200C}').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Arabic proclitics that attach to the following word (و, ب, ل, ف and the article).
const ARABIC_PREFIXES: &[&str] = &["وال", "بال", "فال", "لل", "ال", "و", "ب", "ل", "ف"];

/// Kurdish (Sorani) definite and plural suffixes.
const KURDISH_SUFFIXES: &[&str] = &["ەکان", "ەکە", "انی", "ان", "ی", "ە"];

/// Whether a token is `word`, allowing Arabic proclitics and Kurdish suffixes
/// on Arabic-script words.
pub fn token_matches(token: &str, word: &str) -> bool {
    if token == word {
        return true;
    }
    if !word.chars().any(is_arabic_script) {
        return false;
    }

    let stems = std::iter::once(token).chain(
        ARABIC_PREFIXES
            .iter()
            .filter_map(|p| token.strip_prefix(p)),
    );

    for stem in stems {
        if stem == word {
            return true;
        }
        if KURDISH_SUFFIXES
            .iter()
            .filter_map(|s| stem.strip_suffix(s))
            .any(|base| base == word)
        {
            return true;
        }
    }
    false
}

/// Byte offset of the first occurrence of `needle` in lowercased text. Latin
/// phrases must sit on word boundaries; Arabic-script phrases match anywhere,
/// since proclitics and suffixes attach directly to the word. Names go
/// through [`contains_token_phrase`] instead.
pub fn find_phrase(haystack_lower: &str, needle: &str) -> Option<usize> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    if needle.chars().any(is_arabic_script) {
        return haystack_lower.find(&needle);
    }

    haystack_lower
        .match_indices(&needle)
        .map(|(start, _)| start)
        .find(|&start| {
            let before = haystack_lower[..start].chars().next_back();
            let after = haystack_lower[start + needle.len()..].chars().next();
            !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
        })
}

pub fn contains_phrase(haystack_lower: &str, needle: &str) -> bool {
    find_phrase(haystack_lower, needle).is_some()
}

/// Whether the words of `phrase` appear as consecutive tokens, each compared
/// with [`token_matches`].
pub fn contains_token_phrase(tokens: &[String], phrase: &str) -> bool {
    let words = tokenize(phrase);
    if words.is_empty() || words.len() > tokens.len() {
        return false;
    }
    tokens.windows(words.len()).any(|window| {
        window
            .iter()
            .zip(&words)
            .all(|(token, word)| token_matches(token, word))
    })
}
