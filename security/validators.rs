//! Format validation for payment credentials
//!
//! These checks validate shape only; they never touch stored data and
//! never log their input.

use regex::Regex;
use std::sync::OnceLock;

fn mobile_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // 11 local digits: trunk 0, operator 1[3-9], 8 subscriber digits.
    // Accepts the 88 country prefix with or without a leading plus.
    RE.get_or_init(|| Regex::new(r"^(?:\+?88)?01[3-9][0-9]{8}$").unwrap())
}

fn pin_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4,6}$").unwrap())
}

fn transaction_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{4,256}$").unwrap())
}

/// Validate a bKash mobile number
///
/// Accepts `01XXXXXXXXX`, `8801XXXXXXXXX`, and `+8801XXXXXXXXX` where the
/// operator digit is 3-9. Anything with other characters, a wrong length,
/// or an invalid operator digit is rejected.
pub fn validate_bkash_mobile_number(number: &str) -> bool {
    mobile_regex().is_match(number)
}

/// Validate a bKash PIN format: numeric, length 4-6
pub fn validate_pin_format(pin: &str) -> bool {
    pin_regex().is_match(pin)
}

/// Validate a client-supplied transaction reference
///
/// 4-256 characters from `[A-Za-z0-9_-]`.
pub fn validate_transaction_ref(reference: &str) -> bool {
    transaction_ref_regex().is_match(reference)
}
