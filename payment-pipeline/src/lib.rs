//! CarePay Payment Pipeline
//!
//! Authorization pipeline for booking payments: validation, server-side
//! price recomputation, fraud risk assessment, and atomic commit, with a
//! hash-chained audit trail.
//!
//! # Architecture
//!
//! - **State machine per attempt**: RECEIVED → VALIDATED → PRICED →
//!   RISK_ASSESSED → {COMMITTED | CHALLENGED | BLOCKED | REJECTED}
//! - **Ports everywhere**: persistence, signals, audit, and time are
//!   injected traits
//! - **Server-derived truth**: prices and add-on charges are recomputed
//!   from stored state, never taken from the client
//!
//! # Invariants
//!
//! - No partial mutation on any error path
//! - One debit per `(user_id, transaction_ref)` pair, even under races
//! - Blocked attempts leave bookings and balances untouched

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod audit;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod pipeline;
pub mod pricing;

// Re-exports
pub use audit::{AuditSink, MemoryAuditSink};
pub use config::{ConfigError, PipelineConfig};
pub use eligibility::{
    parse_boolean_intent, rapid_assistance_charge, validate_eligibility, BoolIntent,
    EligibilityCheck,
};
pub use error::{PaymentError, Result};
pub use pipeline::{PaymentOutcome, PaymentPipeline, PaymentRequest, RequestContext};
pub use pricing::compute_expected_total;
