//! Human-readable byte sizes such as `10Gi`, `500Mi`, or `1.5 GB`.
//!
//! SI units (`K`, `KB`, `M`, ...) are powers of 1000 and IEC units (`Ki`,
//! `KiB`, `Mi`, ...) are powers of 1024. Units are case-insensitive and may
//! be separated from the number by whitespace. Commas in the number are
//! thousands separators and are ignored.

use crate::error::{PloopError, Result};

const KB: u64 = 1000;
const KIB: u64 = 1024;

const UNITS: &[(&str, u64)] = &[
    ("", 1),
    ("b", 1),
    ("k", KB),
    ("kb", KB),
    ("ki", KIB),
    ("kib", KIB),
    ("m", KB.pow(2)),
    ("mb", KB.pow(2)),
    ("mi", KIB.pow(2)),
    ("mib", KIB.pow(2)),
    ("g", KB.pow(3)),
    ("gb", KB.pow(3)),
    ("gi", KIB.pow(3)),
    ("gib", KIB.pow(3)),
    ("t", KB.pow(4)),
    ("tb", KB.pow(4)),
    ("ti", KIB.pow(4)),
    ("tib", KIB.pow(4)),
    ("p", KB.pow(5)),
    ("pb", KB.pow(5)),
    ("pi", KIB.pow(5)),
    ("pib", KIB.pow(5)),
    ("e", KB.pow(6)),
    ("eb", KB.pow(6)),
    ("ei", KIB.pow(6)),
    ("eib", KIB.pow(6)),
];

/// Fractional digits beyond this are ignored.
const MAX_FRACTION_DIGITS: usize = 18;

/// Parses a size string like `"10Gi"` or `"1.5 GB"` into bytes.
///
/// Fractions are truncated to whole bytes.
///
/// # Errors
///
/// Returns [`PloopError::InvalidSize`] if the number is missing or
/// malformed, the unit is unknown, or the result does not fit in a `u64`.
pub fn parse_bytes(input: &str) -> Result<u64> {
    let invalid = |reason: String| PloopError::InvalidSize {
        value: input.to_string(),
        reason,
    };

    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);
    let number = number.replace(',', "");

    let unit = unit.trim().to_ascii_lowercase();
    let multiplier = UNITS
        .iter()
        .find(|(name, _)| *name == unit)
        .map(|(_, m)| u128::from(*m))
        .ok_or_else(|| invalid(format!("unknown unit {unit:?}")))?;

    let (whole, fraction) = number.split_once('.').unwrap_or((number.as_str(), ""));
    if fraction.contains('.') || (whole.is_empty() && fraction.is_empty()) {
        return Err(invalid("expected a number".into()));
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole
            .parse()
            .map_err(|_| invalid("number is too large".into()))?
    };
    let mut total = whole
        .checked_mul(multiplier)
        .ok_or_else(|| invalid("size exceeds 64 bits".into()))?;

    let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    if !digits.is_empty() {
        let scale = digits.chars().fold(1_u128, |scale, _| scale * 10);
        let numerator: u128 = digits
            .parse()
            .map_err(|_| invalid("expected a number".into()))?;
        total += numerator * multiplier / scale;
    }

    u64::try_from(total).map_err(|_| invalid("size exceeds 64 bits".into()))
}

/// Converts bytes to the kilobyte count the ploop tool expects, dropping
/// any remainder.
#[must_use]
pub const fn to_kilobytes(bytes: u64) -> u64 {
    bytes / KIB
}
