//! Security Module for CarePay
//!
//! Provides the security primitives the payment pipeline depends on:
//! - bKash mobile number and PIN format validation
//! - Irreversible masking for display and log output
//! - Canonical-JSON audit hashing for tamper detection
//! - Collision-resistant transaction reference generation
//! - AES-256-GCM authenticated encryption for sensitive stored fields
//! - Append-only audit log with hash chain and integrity verification
//!
//! # Features
//!
//! ## Validators (`validators`)
//! - Bangladeshi mobile numbering rules with international prefixes
//! - Numeric PIN format (4-6 digits)
//! - Transaction reference format (4-256 chars, restricted charset)
//!
//! ## Masking (`masking`)
//! - Mobile numbers keep first 3 and last 3 characters only
//! - PINs are fully masked; output never reveals length-zero input
//!
//! ## Canonical hashing (`canonical`)
//! - Recursively sorted object keys before digesting
//! - Same logical data always produces the same 64-hex-char SHA-256
//!
//! ## Field encryption (`crypto`)
//! - AES-256-GCM with explicit IV and tag
//! - Tampered ciphertext, IV, or tag fails closed with an integrity error
//!
//! ## Audit Logging (`audit_log`)
//! - Append-only JSONL log with hash chain
//! - Tamper detection via `verify_integrity`

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod audit_log;
pub mod canonical;
pub mod crypto;
pub mod masking;
pub mod validators;

// Re-exports for convenience
pub use audit_log::{AuditEvent, AuditEventType, AuditLogger, AuditSeverity};
pub use canonical::{audit_hash, canonicalize};
pub use crypto::{generate_transaction_ref, EncryptedField, FieldCipher};
pub use masking::{mask_mobile_number, mask_pin};
pub use validators::{
    validate_bkash_mobile_number, validate_pin_format, validate_transaction_ref,
};
