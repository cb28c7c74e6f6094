//! Currency formatting, parsing, and rounding for BDT
//!
//! Amounts are grouped lakh/crore style: a first group of three digits,
//! then groups of two (`12,34,567.89`). Rounding is half-up at the paisa
//! boundary, not banker's rounding.

use crate::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Taka currency symbol
pub const SYMBOL: &str = "৳";

/// Round an amount to 2 decimal places, half-up
///
/// 0.005 rounds away from zero: `round(10.005) == 10.01`.
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount with symbol, lakh/crore grouping, and 2 fractional digits
///
/// Negative amounts carry a leading sign before the symbol; zero formats
/// as `৳0.00` with no special-casing.
pub fn format(amount: Decimal) -> String {
    let rounded = round(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let plain = abs.to_string();
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (plain, String::new()),
    };
    let frac = pad_fraction(&frac_part);

    let grouped = group_lakh_crore(&int_part);
    if negative {
        format!("-{}{}.{}", SYMBOL, grouped, frac)
    } else {
        format!("{}{}.{}", SYMBOL, grouped, frac)
    }
}

/// Parse a formatted amount back to a decimal
///
/// Strips the symbol, grouping commas, and surrounding whitespace; any
/// non-numeric residue is rejected.
pub fn parse(input: &str) -> Result<Decimal> {
    let stripped: String = input
        .trim()
        .replace(SYMBOL, "")
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let stripped = stripped.trim();

    if stripped.is_empty() {
        return Err(Error::AmountParse("empty amount".to_string()));
    }

    Decimal::from_str(stripped)
        .map_err(|e| Error::AmountParse(format!("'{}': {}", stripped, e)))
}

/// Pad a fraction to exactly two digits
fn pad_fraction(frac: &str) -> String {
    // round() already limits scale to 2
    match frac.len() {
        0 => "00".to_string(),
        1 => format!("{}0", frac),
        _ => frac[..2].to_string(),
    }
}

/// Group integer digits: last 3 together, then groups of 2
fn group_lakh_crore(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_grouping() {
        assert_eq!(format(Decimal::new(123456789, 2)), "৳12,34,567.89");
        assert_eq!(format(Decimal::from(1000)), "৳1,000.00");
        assert_eq!(format(Decimal::from(100)), "৳100.00");
        assert_eq!(format(Decimal::from(100000)), "৳1,00,000.00");
        assert_eq!(format(Decimal::from(10000000)), "৳1,00,00,000.00");
    }

    #[test]
    fn test_format_zero_and_negative() {
        assert_eq!(format(Decimal::ZERO), "৳0.00");
        assert_eq!(format(Decimal::from(-500)), "-৳500.00");
        assert_eq!(format(Decimal::new(-123456, 2)), "-৳1,234.56");
    }

    #[test]
    fn test_format_pads_fraction() {
        assert_eq!(format(Decimal::new(15, 1)), "৳1.50");
        assert_eq!(format(Decimal::from(7)), "৳7.00");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round(Decimal::new(10005, 3)), Decimal::new(1001, 2)); // 10.005 -> 10.01
        assert_eq!(round(Decimal::new(10004, 3)), Decimal::new(1000, 2)); // 10.004 -> 10.00
        assert_eq!(round(Decimal::new(25, 3)), Decimal::new(3, 2)); // 0.025 -> 0.03
    }

    #[test]
    fn test_parse_formatted() {
        assert_eq!(parse("৳12,34,567.89").unwrap(), Decimal::new(123456789, 2));
        assert_eq!(parse("৳0.00").unwrap(), Decimal::ZERO);
        assert_eq!(parse("-৳500.00").unwrap(), Decimal::from(-500));
        assert_eq!(parse("  1000 ").unwrap(), Decimal::from(1000));
    }

    #[test]
    fn test_parse_rejects_residue() {
        assert!(parse("৳12a3.00").is_err());
        assert!(parse("").is_err());
        assert!(parse("৳").is_err());
        assert!(parse("twelve").is_err());
    }

    #[test]
    fn test_round_trip() {
        for raw in ["0", "0.005", "999.994", "1234567.89", "80000000.5"] {
            let x = Decimal::from_str(raw).unwrap();
            assert_eq!(round(parse(&format(x)).unwrap()), round(x), "raw = {raw}");
        }
    }
}
