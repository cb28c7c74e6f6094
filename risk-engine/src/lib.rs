//! Fraud Risk Engine for CarePay
//!
//! Behavioral risk assessment for booking payments

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod ip;
pub mod scoring;
pub mod signals;
pub mod types;

pub use error::{Error, Result};
pub use ip::is_suspicious_ip;
pub use scoring::{FraudScorer, ScorerConfig};
pub use signals::{ActivityTracker, FraudSignalSource};
pub use types::*;
