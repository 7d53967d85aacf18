use sha2::{Digest, Sha256};

/// Content hash for duplicate detection.
///
/// SHA256 of the normalized text: lowercased, punctuation dropped, whitespace
/// collapsed. Letters and digits of any script survive normalization, so
/// Arabic and Kurdish posts hash on their words, not their punctuation.
/// Zero-width joiners used in legacy Kurdish spellings are stripped as well.
pub fn generate_content_hash(text: &str) -> String {
    let normalized = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}
