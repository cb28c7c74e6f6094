//! Error types for booking core

use thiserror::Error;

/// Result type for booking-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Booking core errors
#[derive(Error, Debug)]
pub enum Error {
    /// Booking does not exist
    #[error("Booking not found: {0}")]
    BookingNotFound(uuid::Uuid),

    /// No pricing configured for the hospital/resource pair
    #[error("No pricing configured for hospital {hospital_id} resource {resource}")]
    PricingNotFound {
        /// Hospital identifier
        hospital_id: uuid::Uuid,
        /// Resource type name
        resource: String,
    },

    /// Booking already paid
    #[error("Payment has already been completed for this booking")]
    AlreadyPaid,

    /// Booking cancelled
    #[error("Cannot process payment for a cancelled booking")]
    BookingCancelled,

    /// Transaction reference already used by this user
    #[error("Duplicate transaction reference: {0}")]
    DuplicateTransaction(String),

    /// Debit would make the balance negative
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount the debit requires
        required: rust_decimal::Decimal,
        /// Balance currently available
        available: rust_decimal::Decimal,
    },

    /// Monetary amount could not be parsed
    #[error("Amount parse error: {0}")]
    AmountParse(String),

    /// Invalid state transition or corrupted record
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}
