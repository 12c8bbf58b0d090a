//! # Luhn Check Digits
//!
//! Mod-10 check digit used as the final character of every PDA-ID.
//!
//! Scanning from the rightmost payload digit, every second digit (starting
//! with the rightmost) is doubled; a doubled value above 9 has 9 subtracted.
//! The check digit is whatever brings the sum to a multiple of ten.
//!
//! Verification runs the same doubling pattern over the full string, shifted
//! one place left so the check digit itself is never doubled. Any single
//! substituted digit changes the total by a non-multiple of ten and is
//! therefore detected.

use crate::error::ValidationError;

/// Compute the check digit for a string of decimal digits.
///
/// An empty payload has check digit 0.
///
/// # Errors
///
/// Returns [`ValidationError::NonDigit`] if `digits` contains anything other
/// than ASCII `0`-`9`.
pub fn compute_check_digit(digits: &str) -> Result<u8, ValidationError> {
    let values = parse_digits(digits)?;
    let sum = luhn_sum(&values, true);
    Ok(((10 - sum % 10) % 10) as u8)
}

/// Validate a digit string whose last character is a Luhn check digit.
///
/// Returns `false` for strings shorter than two digits or containing
/// non-digit characters.
pub fn validate(full_digits: &str) -> bool {
    match parse_digits(full_digits) {
        Ok(values) if values.len() >= 2 => luhn_sum(&values, false) % 10 == 0,
        _ => false,
    }
}

fn parse_digits(digits: &str) -> Result<Vec<u8>, ValidationError> {
    digits
        .bytes()
        .map(|b| {
            if b.is_ascii_digit() {
                Ok(b - b'0')
            } else {
                Err(ValidationError::NonDigit(digits.to_string()))
            }
        })
        .collect()
}

/// Sum with alternate doubling from the right. `double_rightmost` selects
/// whether position 0 (from the right) is doubled.
fn luhn_sum(values: &[u8], double_rightmost: bool) -> u32 {
    values
        .iter()
        .rev()
        .enumerate()
        .map(|(pos, &d)| {
            let d = u32::from(d);
            if (pos % 2 == 0) == double_rightmost {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum()
}
