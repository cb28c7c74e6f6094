//! Rapid assistance eligibility
//!
//! Client intent arrives as loosely-typed JSON and is normalized through
//! `parse_boolean_intent` before it can influence anything. Eligibility is
//! judged only against stored patient data.

use rust_decimal::Decimal;
use serde_json::Value;

/// Normalized boolean intent from a client payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolIntent {
    /// Affirmative
    Yes,
    /// Negative or absent
    No,
    /// Not interpretable as a boolean
    Invalid,
}

/// Normalize a JSON value into a boolean intent
///
/// Total over all JSON values. Accepted affirmatives: `true`, `"true"`,
/// `"yes"`, `"1"`, `1`. Accepted negatives: `false`, `"false"`, `"no"`,
/// `"0"`, `""`, `0`, `null`. Everything else is `Invalid`, never coerced.
pub fn parse_boolean_intent(value: &Value) -> BoolIntent {
    match value {
        Value::Bool(true) => BoolIntent::Yes,
        Value::Bool(false) | Value::Null => BoolIntent::No,
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => BoolIntent::Yes,
            "false" | "no" | "0" | "" => BoolIntent::No,
            _ => BoolIntent::Invalid,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => BoolIntent::Yes,
            Some(0) => BoolIntent::No,
            _ => BoolIntent::Invalid,
        },
        Value::Array(_) | Value::Object(_) => BoolIntent::Invalid,
    }
}

/// Outcome of an eligibility validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityCheck {
    /// Whether the request passes
    pub is_valid: bool,

    /// Human-readable failure reasons, empty when valid
    pub errors: Vec<String>,
}

impl EligibilityCheck {
    fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![error.into()],
        }
    }
}

/// Validate rapid assistance eligibility against stored patient data
///
/// When not requested the check always passes. When requested the stored
/// age must be present, finite, non-negative, and humanly plausible, and
/// must meet `min_age` exactly (`min_age` itself is eligible, no epsilon).
pub fn validate_eligibility(age: Option<f64>, requested: bool, min_age: f64) -> EligibilityCheck {
    if !requested {
        return EligibilityCheck::valid();
    }

    let age = match age {
        Some(age) => age,
        None => return EligibilityCheck::invalid("Invalid patient age detected"),
    };

    if !age.is_finite() || age < 0.0 || age > 150.0 {
        return EligibilityCheck::invalid("Invalid patient age detected");
    }

    if age < min_age {
        return EligibilityCheck::invalid(format!(
            "Patient must be at least {min_age:.0} years old for rapid assistance"
        ));
    }

    EligibilityCheck::valid()
}

/// Rapid assistance add-on charge for a validated request
///
/// Stateless: same inputs always produce the same charge.
pub fn rapid_assistance_charge(requested: bool, fee: Decimal) -> Decimal {
    if requested {
        fee
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_intent_affirmatives() {
        for v in [json!(true), json!("true"), json!("yes"), json!("1"), json!(1)] {
            assert_eq!(parse_boolean_intent(&v), BoolIntent::Yes, "{v}");
        }
        assert_eq!(parse_boolean_intent(&json!("  YES ")), BoolIntent::Yes);
    }

    #[test]
    fn test_intent_negatives() {
        for v in [
            json!(false),
            json!("false"),
            json!("no"),
            json!("0"),
            json!(""),
            json!(0),
            Value::Null,
        ] {
            assert_eq!(parse_boolean_intent(&v), BoolIntent::No, "{v}");
        }
    }

    #[test]
    fn test_intent_garbage_is_invalid_not_coerced() {
        for v in [
            json!("maybe"),
            json!(2),
            json!(-1),
            json!(1.5),
            json!([true]),
            json!({"enabled": true}),
        ] {
            assert_eq!(parse_boolean_intent(&v), BoolIntent::Invalid, "{v}");
        }
    }

    #[test]
    fn test_not_requested_always_valid() {
        assert!(validate_eligibility(None, false, 60.0).is_valid);
        assert!(validate_eligibility(Some(f64::NAN), false, 60.0).is_valid);
    }

    #[test]
    fn test_age_boundary_exact() {
        assert!(validate_eligibility(Some(60.0), true, 60.0).is_valid);
        assert!(!validate_eligibility(Some(59.999), true, 60.0).is_valid);
        assert!(validate_eligibility(Some(60.0001), true, 60.0).is_valid);
        assert!(validate_eligibility(Some(150.0), true, 60.0).is_valid);
    }

    #[test]
    fn test_corrupt_ages_rejected_distinctly() {
        for age in [
            None,
            Some(f64::NAN),
            Some(f64::INFINITY),
            Some(f64::NEG_INFINITY),
            Some(-1.0),
            Some(151.0),
        ] {
            let check = validate_eligibility(age, true, 60.0);
            assert!(!check.is_valid, "{age:?}");
            assert_eq!(check.errors, vec!["Invalid patient age detected"]);
        }
    }

    #[test]
    fn test_underage_gets_age_message_not_corruption_message() {
        let check = validate_eligibility(Some(45.0), true, 60.0);
        assert!(!check.is_valid);
        assert_ne!(check.errors, vec!["Invalid patient age detected"]);
    }

    #[test]
    fn test_charge_is_stateless() {
        let fee = Decimal::from(200);
        assert_eq!(rapid_assistance_charge(true, fee), fee);
        assert_eq!(rapid_assistance_charge(false, fee), Decimal::ZERO);
        assert_eq!(
            rapid_assistance_charge(true, fee),
            rapid_assistance_charge(true, fee)
        );
    }
}
