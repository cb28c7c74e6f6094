//! Payment pipeline error taxonomy
//!
//! Every variant carries a stable machine-checkable code and an HTTP
//! status for the transport layer. No error path leaves partial state
//! behind, and error payloads never echo unmasked credentials.

use risk_engine::RiskLevel;
use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment authorization errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Booking or pricing configuration does not exist
    #[error("Booking not found")]
    NotFound,

    /// Acting user does not own the booking
    #[error("You are not allowed to pay for this booking")]
    AccessDenied,

    /// Booking already paid
    #[error("Payment has already been completed for this booking")]
    AlreadyPaid,

    /// Booking cancelled
    #[error("Cannot process payment for a cancelled booking")]
    BookingCancelled,

    /// Amount missing, non-positive, or unparseable
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    /// Transaction reference fails format validation
    #[error("Invalid transaction reference format")]
    InvalidTransactionRef,

    /// Submitted amount does not match the recomputed total
    #[error("Payment amount mismatch: expected {expected}, got {submitted}")]
    AmountMismatch {
        /// Server-computed total
        expected: Decimal,
        /// Client-submitted amount
        submitted: Decimal,
    },

    /// Rapid assistance eligibility failed
    #[error("{0}")]
    InvalidEligibility(String),

    /// Transaction reference already used by this user
    #[error("Duplicate transaction reference: {0}")]
    DuplicateTransaction(String),

    /// Debit would make the balance negative
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount the debit requires
        required: Decimal,
        /// Balance currently available
        available: Decimal,
    },

    /// Audit trail or stored record failed an integrity check
    #[error("Integrity failure: {0}")]
    IntegrityFailure(String),

    /// Risk assessment refused the payment
    #[error("Payment blocked by fraud risk assessment")]
    FraudBlocked {
        /// Risk tier that triggered the block
        risk_level: RiskLevel,
    },

    /// Collaborator fault outside the taxonomy
    #[error("Unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl PaymentError {
    /// Stable machine-checkable error code
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::NotFound => "NOT_FOUND",
            PaymentError::AccessDenied => "ACCESS_DENIED",
            PaymentError::AlreadyPaid => "ALREADY_PAID",
            PaymentError::BookingCancelled => "BOOKING_CANCELLED",
            PaymentError::InvalidAmount(_) => "INVALID_AMOUNT",
            PaymentError::InvalidTransactionRef => "INVALID_TRANSACTION_REF",
            PaymentError::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            PaymentError::InvalidEligibility(_) => "INVALID_ELIGIBILITY",
            PaymentError::DuplicateTransaction(_) => "DUPLICATE_TRANSACTION",
            PaymentError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            PaymentError::IntegrityFailure(_) => "INTEGRITY_FAILURE",
            PaymentError::FraudBlocked { .. } => "FRAUD_BLOCKED",
            PaymentError::Unexpected(_) => "UNEXPECTED",
        }
    }

    /// HTTP status for the transport layer
    pub fn status(&self) -> u16 {
        match self {
            PaymentError::NotFound => 404,
            PaymentError::AccessDenied | PaymentError::FraudBlocked { .. } => 403,
            PaymentError::AlreadyPaid
            | PaymentError::BookingCancelled
            | PaymentError::InvalidAmount(_)
            | PaymentError::InvalidTransactionRef
            | PaymentError::AmountMismatch { .. }
            | PaymentError::InvalidEligibility(_)
            | PaymentError::DuplicateTransaction(_)
            | PaymentError::InsufficientBalance { .. } => 400,
            PaymentError::IntegrityFailure(_) | PaymentError::Unexpected(_) => 500,
        }
    }
}

impl From<booking_core::Error> for PaymentError {
    fn from(err: booking_core::Error) -> Self {
        use booking_core::Error;
        match err {
            Error::BookingNotFound(_) | Error::PricingNotFound { .. } => PaymentError::NotFound,
            Error::AlreadyPaid => PaymentError::AlreadyPaid,
            Error::BookingCancelled => PaymentError::BookingCancelled,
            Error::DuplicateTransaction(r) => PaymentError::DuplicateTransaction(r),
            Error::InsufficientBalance {
                required,
                available,
            } => PaymentError::InsufficientBalance {
                required,
                available,
            },
            Error::AmountParse(msg) => PaymentError::InvalidAmount(msg),
            Error::InvalidState(msg) | Error::Storage(msg) => {
                PaymentError::Unexpected(anyhow::anyhow!(msg))
            }
        }
    }
}

impl From<risk_engine::Error> for PaymentError {
    fn from(err: risk_engine::Error) -> Self {
        PaymentError::Unexpected(anyhow::Error::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        assert_eq!(PaymentError::NotFound.status(), 404);
        assert_eq!(PaymentError::AccessDenied.status(), 403);
        assert_eq!(
            PaymentError::FraudBlocked {
                risk_level: RiskLevel::High
            }
            .status(),
            403
        );
        assert_eq!(PaymentError::AlreadyPaid.status(), 400);
        assert_eq!(PaymentError::InvalidTransactionRef.status(), 400);
        assert_eq!(
            PaymentError::IntegrityFailure("chain broken".into()).status(),
            500
        );
        assert_eq!(PaymentError::AlreadyPaid.code(), "ALREADY_PAID");
        assert_eq!(
            PaymentError::DuplicateTransaction("TXN1".into()).code(),
            "DUPLICATE_TRANSACTION"
        );
    }

    #[test]
    fn test_store_error_mapping() {
        let err: PaymentError = booking_core::Error::AlreadyPaid.into();
        assert!(matches!(err, PaymentError::AlreadyPaid));

        let err: PaymentError =
            booking_core::Error::BookingNotFound(uuid::Uuid::new_v4()).into();
        assert!(matches!(err, PaymentError::NotFound));

        let err: PaymentError = booking_core::Error::Storage("disk full".into()).into();
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_messages_distinct_for_terminal_states() {
        assert_ne!(
            PaymentError::AlreadyPaid.to_string(),
            PaymentError::BookingCancelled.to_string()
        );
    }
}
