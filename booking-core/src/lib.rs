//! CarePay Booking Core
//!
//! Domain types and persistence ports for the payment authorization
//! pipeline.
//!
//! # Architecture
//!
//! - **Exact arithmetic**: `Decimal` for all monetary values
//! - **Ports over singletons**: persistence and time are injected traits
//! - **Atomic commit**: balance debit, booking update, and transaction
//!   insert happen under one critical section
//!
//! # Invariants
//!
//! - Booking payment status only moves Pending → Paid or Pending → Cancelled
//! - A `(user_id, transaction_ref)` pair is debited at most once
//! - Transaction records are immutable once committed

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod clock;
pub mod currency;
pub mod error;
pub mod store;
pub mod types;

// Re-exports
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use store::{MemoryStore, PaymentCommit, Store};
pub use types::{
    Booking, HospitalPricing, PaymentStatus, PricingQuote, ResourceType, Transaction,
    TransactionStatus,
};
