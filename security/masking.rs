//! Irreversible masking for display and log output
//!
//! Masking output is safe to echo in error payloads and audit metadata;
//! the original value cannot be recovered from it.

/// Fixed middle segment for masked mobile numbers
const MOBILE_MASK: &str = "*****";

/// Fixed-width full mask for inputs too short to partially reveal
const FULL_MASK: &str = "********";

/// Minimum PIN mask width, applied even to empty input
const MIN_PIN_MASK: usize = 4;

/// Mask a mobile number for display
///
/// Keeps the first 3 and last 3 characters around a fixed-width mask:
/// `01712345678` becomes `017*****678`. Inputs shorter than 7 characters
/// collapse to a full fixed-width mask so nothing is revealed.
pub fn mask_mobile_number(number: &str) -> String {
    let chars: Vec<char> = number.chars().collect();
    if chars.len() < 7 {
        return FULL_MASK.to_string();
    }

    let prefix: String = chars[..3].iter().collect();
    let suffix: String = chars[chars.len() - 3..].iter().collect();
    format!("{}{}{}", prefix, MOBILE_MASK, suffix)
}

/// Mask a PIN completely
///
/// Output length matches the input length so format errors stay
/// diagnosable, with a minimum width so empty input reveals nothing.
pub fn mask_pin(pin: &str) -> String {
    "*".repeat(pin.chars().count().max(MIN_PIN_MASK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_mobile() {
        assert_eq!(mask_mobile_number("01712345678"), "017*****678");
        assert_eq!(mask_mobile_number("+8801712345678"), "+88*****678");
    }

    #[test]
    fn test_mask_mobile_short_input_collapses() {
        assert_eq!(mask_mobile_number("017123"), "********");
        assert_eq!(mask_mobile_number("01"), "********");
        assert_eq!(mask_mobile_number(""), "********");
    }

    #[test]
    fn test_mask_mobile_never_reveals_middle() {
        let masked = mask_mobile_number("01712345678");
        assert!(!masked.contains("1234"));
        assert_eq!(masked.len(), 11);
    }

    #[test]
    fn test_mask_pin() {
        assert_eq!(mask_pin("1234"), "****");
        assert_eq!(mask_pin("123456"), "******");
    }

    #[test]
    fn test_mask_pin_minimum_width() {
        assert_eq!(mask_pin(""), "****");
        assert_eq!(mask_pin("12"), "****");
    }
}
