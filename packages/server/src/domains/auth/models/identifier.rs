use sha2::{Digest, Sha256};

/// Twilio's magic number; accepted with [`TEST_CODE`] when test identifiers are enabled.
pub const TEST_PHONE_NUMBER: &str = "+15005550006";
pub const TEST_CODE: &str = "123456";

/// Normalizes a phone number to E.164.
///
/// Accepts `+964…`, `00964…` and Iraqi local `07…` forms. Spaces, dashes,
/// dots and parentheses are dropped.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
        .collect();

    let digits = if let Some(rest) = compact.strip_prefix('+') {
        rest.to_string()
    } else if let Some(rest) = compact.strip_prefix("00") {
        rest.to_string()
    } else if compact.starts_with("07") && compact.len() == 11 {
        format!("964{}", &compact[1..])
    } else {
        return None;
    };

    if !(8..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    Some(format!("+{}", digits))
}

pub fn is_test_identifier(phone_number: &str) -> bool {
    phone_number == TEST_PHONE_NUMBER
}

/// Short SHA-256 fingerprint used in logs in place of the number itself.
pub fn phone_fingerprint(phone_number: &str) -> String {
    let digest = Sha256::digest(phone_number.as_bytes());
    format!("{:x}", digest)[..12].to_string()
}
