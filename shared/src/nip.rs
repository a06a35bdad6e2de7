//! NIP (Polish tax identifier) normalization and checksum validation
//!
//! A NIP is ten digits where the last digit is a checksum over the first nine,
//! weighted by [`NIP_WEIGHTS`] and reduced modulo 11. Callers may pass the
//! identifier with the usual separators (`123-456-78-19`, `123 456 78 19`,
//! `123.456.78.19`); everything else is kept and later rejected.

use thiserror::Error;

use crate::types::ValidationResult;

/// Number of digits in a normalized NIP
pub const NIP_LENGTH: usize = 10;

/// Checksum weights applied to the first nine digits
pub const NIP_WEIGHTS: [u32; 9] = [6, 5, 7, 2, 3, 4, 5, 6, 7];

/// Identifiers that must never be resolved in production.
///
/// `5261040828` is the identifier used throughout the public registry
/// documentation and its test environment.
pub const TEST_NIPS: &[&str] = &[
    "0000000000",
    "1111111111",
    "1234567890",
    "9999999999",
    "5261040828",
];

/// Reason a raw identifier was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("NIP is required")]
    Required,

    #[error("NIP must be exactly 10 digits")]
    WrongLength,

    #[error("NIP must contain only digits")]
    NonDigit,

    /// Weighted sum mod 11 is 10, which no single check digit can encode
    #[error("Invalid NIP - checksum error")]
    UnencodableChecksum,

    #[error("Invalid NIP checksum")]
    ChecksumMismatch,
}

/// Strip whitespace, dashes and dots. Any other character is preserved.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '.')
        .collect()
}

/// Validate a raw identifier and return its normalized form
pub fn parse(raw: &str) -> Result<String, ValidationFailure> {
    if raw.is_empty() {
        return Err(ValidationFailure::Required);
    }

    let normalized = normalize(raw);

    if normalized.chars().count() != NIP_LENGTH {
        return Err(ValidationFailure::WrongLength);
    }

    let digits: Vec<u32> = normalized
        .chars()
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()
        .ok_or(ValidationFailure::NonDigit)?;

    let checksum = weighted_sum(&digits[..9]) % 11;
    if checksum == 10 {
        return Err(ValidationFailure::UnencodableChecksum);
    }
    if checksum != digits[9] {
        return Err(ValidationFailure::ChecksumMismatch);
    }

    Ok(normalized)
}

/// Validate a raw identifier into the caller-facing result shape
pub fn validate(raw: &str) -> ValidationResult {
    match parse(raw) {
        Ok(normalized) => ValidationResult::valid(normalized),
        Err(failure) => ValidationResult::invalid(failure),
    }
}

/// Render a normalized NIP as `DDD-DDD-DD-DD`.
///
/// Input that is not exactly ten characters is returned unchanged.
pub fn format_nip(nip: &str) -> String {
    if nip.len() != NIP_LENGTH || !nip.is_ascii() {
        return nip.to_string();
    }
    format!("{}-{}-{}-{}", &nip[0..3], &nip[3..6], &nip[6..8], &nip[8..10])
}

/// Whether the normalized identifier is a well-known example value
pub fn is_test_nip(nip: &str) -> bool {
    TEST_NIPS.contains(&nip)
}

fn weighted_sum(digits: &[u32]) -> u32 {
    digits
        .iter()
        .zip(NIP_WEIGHTS.iter())
        .map(|(digit, weight)| digit * weight)
        .sum()
}
