use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lexicon::{
    ARABIC_ONLY_LETTERS, BADINI_LETTER, BADINI_MARKER_WORDS, ENGLISH_MARKER_WORDS,
    KURDISH_LETTERS, KURMANJI_ELECTION_TERMS, KURMANJI_LETTERS, KURMANJI_MARKER_WORDS,
    LEGACY_HEH, SORANI_MARKER_WORDS,
};
use super::text::{is_arabic_script, is_latin_letter, tokenize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sorani,
    Badini,
    Kurmanji,
    Arabic,
    English,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::Sorani,
        Dialect::Badini,
        Dialect::Kurmanji,
        Dialect::Arabic,
        Dialect::English,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sorani => "sorani",
            Self::Badini => "badini",
            Self::Kurmanji => "kurmanji",
            Self::Arabic => "arabic",
            Self::English => "english",
        }
    }

    pub fn is_kurdish(&self) -> bool {
        matches!(self, Self::Sorani | Self::Badini | Self::Kurmanji)
    }

    /// Language code understood by platform search APIs.
    pub fn lang_code(&self) -> &'static str {
        match self {
            Self::Sorani => "ckb",
            Self::Badini | Self::Kurmanji => "ku",
            Self::Arabic => "ar",
            Self::English => "en",
        }
    }

    /// Election keywords collectors search with for this dialect.
    pub fn search_terms(&self) -> &'static [&'static str] {
        use super::lexicon::*;
        match self {
            Self::Sorani => SORANI_ELECTION_TERMS,
            Self::Badini => BADINI_ELECTION_TERMS,
            Self::Kurmanji => KURMANJI_ELECTION_TERMS,
            Self::Arabic => ARABIC_ELECTION_TERMS,
            Self::English => ENGLISH_ELECTION_TERMS,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorani" | "ckb" | "ku_sorani" => Ok(Self::Sorani),
            "badini" | "bahdini" | "ku_badini" => Ok(Self::Badini),
            "kurmanji" | "kmr" | "ku_kurmanji" => Ok(Self::Kurmanji),
            "arabic" | "ar" => Ok(Self::Arabic),
            "english" | "en" => Ok(Self::English),
            other => anyhow::bail!("unknown dialect: {}", other),
        }
    }
}

/// Result of dialect detection. `confidence` is 0 when the text carried no letters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub dialect: Dialect,
    pub confidence: f64,
}

impl Detection {
    fn from_evidence(dialect: Dialect, supporting: usize, total: usize) -> Self {
        let share = if total == 0 {
            0.5
        } else {
            supporting as f64 / total as f64
        };
        Self {
            dialect,
            confidence: share.clamp(0.5, 1.0),
        }
    }
}

/// Detects the dialect of a post.
///
/// Script decides the family first. Arabic-script text is Kurdish only when
/// it carries Kurdish letters or marker words; among Kurdish text, the
/// legacy heh+ZWNJ spelling and ڤ point to Badini, the remaining Kurdish
/// letters to Sorani. Latin text with Kurmanji diacritics or political
/// keywords is Kurmanji however many English words surround them.
pub fn detect_dialect(text: &str) -> Detection {
    let arabic_letters = text.chars().filter(|c| is_arabic_script(*c) && c.is_alphabetic()).count();
    let latin_letters = text.chars().filter(|c| is_latin_letter(*c)).count();

    if arabic_letters == 0 && latin_letters == 0 {
        return Detection {
            dialect: Dialect::English,
            confidence: 0.0,
        };
    }

    let tokens = tokenize(text);

    if arabic_letters >= latin_letters {
        detect_arabic_script(text, &tokens)
    } else {
        detect_latin_script(text, &tokens)
    }
}

fn count_words(tokens: &[String], words: &[&str]) -> usize {
    tokens.iter().filter(|t| words.contains(&t.as_str())).count()
}

fn detect_arabic_script(text: &str, tokens: &[String]) -> Detection {
    let sorani_letters = text.chars().filter(|c| KURDISH_LETTERS.contains(c)).count();
    let badini_letters = text.chars().filter(|c| *c == BADINI_LETTER).count()
        + text.matches(LEGACY_HEH).count();

    let sorani = sorani_letters + count_words(tokens, SORANI_MARKER_WORDS);
    let badini = badini_letters + count_words(tokens, BADINI_MARKER_WORDS);

    if sorani + badini == 0 {
        let arabic_only = text.chars().any(|c| ARABIC_ONLY_LETTERS.contains(&c));
        return Detection {
            dialect: Dialect::Arabic,
            confidence: if arabic_only { 0.9 } else { 0.6 },
        };
    }

    // Badini writers still use ە and ێ, so ڤ/legacy heh win once they outnumber
    // the Sorani-only evidence.
    if badini > sorani || (badini_letters > 0 && badini * 2 >= sorani) {
        Detection::from_evidence(Dialect::Badini, badini, sorani + badini)
    } else {
        Detection::from_evidence(Dialect::Sorani, sorani, sorani + badini)
    }
}

fn detect_latin_script(text: &str, tokens: &[String]) -> Detection {
    // Diacritics and political keywords are decisive; marker words only
    // settle text that has neither.
    let decisive = text
        .to_lowercase()
        .chars()
        .filter(|c| KURMANJI_LETTERS.contains(c))
        .count()
        + count_words(tokens, KURMANJI_ELECTION_TERMS);
    let markers = count_words(tokens, KURMANJI_MARKER_WORDS);
    let english = count_words(tokens, ENGLISH_MARKER_WORDS);
    let total = decisive + markers + english;

    if decisive > 0 || markers > english {
        Detection::from_evidence(Dialect::Kurmanji, decisive + markers, total)
    } else {
        Detection::from_evidence(Dialect::English, english, total)
    }
}
