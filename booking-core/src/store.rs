//! Persistence port and in-memory reference adapter
//!
//! The pipeline only talks to the `Store` trait. `commit_payment` is the
//! single mutating entry point and must be all-or-nothing: it re-checks
//! booking state, reference uniqueness, and balance under one critical
//! section so racing attempts observe a clean error, never partial state.

use crate::types::{
    Booking, HospitalPricing, PaymentStatus, ResourceType, Transaction, TransactionStatus,
};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Everything the store needs to commit one payment atomically
#[derive(Debug, Clone)]
pub struct PaymentCommit {
    /// Booking being paid
    pub booking_id: Uuid,

    /// Paying user
    pub user_id: Uuid,

    /// Hospital credited with the payment
    pub hospital_id: Uuid,

    /// Client-supplied idempotency token
    pub transaction_ref: String,

    /// Validated total to debit
    pub amount: Decimal,

    /// Rapid assistance charge included in the total (zero if none)
    pub rapid_assistance_charge: Decimal,

    /// Commit timestamp from the injected clock
    pub committed_at: DateTime<Utc>,
}

/// Persistence port for bookings, balances, and transactions
#[async_trait]
pub trait Store: Send + Sync {
    /// Load a booking by ID
    async fn booking(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Current balance of a user account
    async fn user_balance(&self, user_id: Uuid) -> Result<Decimal>;

    /// Pricing configuration for a hospital/resource pair
    async fn hospital_pricing(
        &self,
        hospital_id: Uuid,
        resource: ResourceType,
    ) -> Result<Option<HospitalPricing>>;

    /// Whether the user has already used this transaction reference
    async fn transaction_ref_exists(&self, user_id: Uuid, transaction_ref: &str) -> Result<bool>;

    /// Atomically debit the user, credit the hospital, mark the booking
    /// paid, and insert the transaction record
    ///
    /// Enforces the unique `(user_id, transaction_ref)` constraint; a
    /// racing duplicate loses with `Error::DuplicateTransaction` and no
    /// mutation.
    async fn commit_payment(&self, commit: PaymentCommit) -> Result<Transaction>;
}

/// In-memory store
///
/// Reference adapter for tests and embedders without a database. A single
/// mutex over the whole state makes `commit_payment` trivially
/// serializable; critical sections are short and never await.
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    bookings: HashMap<Uuid, Booking>,
    user_balances: HashMap<Uuid, Decimal>,
    hospital_balances: HashMap<Uuid, Decimal>,
    pricing: HashMap<(Uuid, ResourceType), HospitalPricing>,
    transactions: Vec<Transaction>,
    used_refs: HashSet<(Uuid, String)>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// Insert or replace a booking
    pub fn insert_booking(&self, booking: Booking) {
        self.inner.lock().bookings.insert(booking.id, booking);
    }

    /// Set a user's balance
    pub fn set_user_balance(&self, user_id: Uuid, balance: Decimal) {
        self.inner.lock().user_balances.insert(user_id, balance);
    }

    /// Configure pricing for a hospital/resource pair
    pub fn insert_pricing(&self, hospital_id: Uuid, resource: ResourceType, pricing: HospitalPricing) {
        self.inner
            .lock()
            .pricing
            .insert((hospital_id, resource), pricing);
    }

    /// Current hospital balance (zero if never credited)
    pub fn hospital_balance(&self, hospital_id: Uuid) -> Decimal {
        self.inner
            .lock()
            .hospital_balances
            .get(&hospital_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// All committed transactions, oldest first
    pub fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().transactions.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn booking(&self, id: Uuid) -> Result<Option<Booking>> {
        Ok(self.inner.lock().bookings.get(&id).cloned())
    }

    async fn user_balance(&self, user_id: Uuid) -> Result<Decimal> {
        Ok(self
            .inner
            .lock()
            .user_balances
            .get(&user_id)
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    async fn hospital_pricing(
        &self,
        hospital_id: Uuid,
        resource: ResourceType,
    ) -> Result<Option<HospitalPricing>> {
        Ok(self
            .inner
            .lock()
            .pricing
            .get(&(hospital_id, resource))
            .cloned())
    }

    async fn transaction_ref_exists(&self, user_id: Uuid, transaction_ref: &str) -> Result<bool> {
        Ok(self
            .inner
            .lock()
            .used_refs
            .contains(&(user_id, transaction_ref.to_string())))
    }

    async fn commit_payment(&self, commit: PaymentCommit) -> Result<Transaction> {
        let mut inner = self.inner.lock();

        // Re-check everything under the lock; the pipeline's earlier reads
        // may be stale by now.
        let booking = inner
            .bookings
            .get(&commit.booking_id)
            .ok_or(Error::BookingNotFound(commit.booking_id))?;

        match booking.payment_status {
            PaymentStatus::Pending => {}
            PaymentStatus::Paid => return Err(Error::AlreadyPaid),
            PaymentStatus::Cancelled => return Err(Error::BookingCancelled),
        }

        let ref_key = (commit.user_id, commit.transaction_ref.clone());
        if inner.used_refs.contains(&ref_key) {
            return Err(Error::DuplicateTransaction(commit.transaction_ref));
        }

        let previous_balance = inner
            .user_balances
            .get(&commit.user_id)
            .copied()
            .unwrap_or(Decimal::ZERO);

        if previous_balance < commit.amount {
            return Err(Error::InsufficientBalance {
                required: commit.amount,
                available: previous_balance,
            });
        }

        // All checks passed: mutate.
        let new_balance = previous_balance - commit.amount;
        inner.user_balances.insert(commit.user_id, new_balance);

        let hospital_credit = inner
            .hospital_balances
            .entry(commit.hospital_id)
            .or_insert(Decimal::ZERO);
        *hospital_credit += commit.amount;

        let booking = inner
            .bookings
            .get_mut(&commit.booking_id)
            .ok_or(Error::BookingNotFound(commit.booking_id))?;
        booking.payment_status = PaymentStatus::Paid;
        if !commit.rapid_assistance_charge.is_zero() {
            booking.rapid_assistance_enabled = true;
            booking.rapid_assistance_charge = commit.rapid_assistance_charge;
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            booking_id: commit.booking_id,
            user_id: commit.user_id,
            transaction_ref: commit.transaction_ref.clone(),
            amount: commit.amount,
            previous_balance,
            new_balance,
            status: TransactionStatus::Completed,
            created_at: commit.committed_at,
        };

        inner.used_refs.insert(ref_key);
        inner.transactions.push(transaction.clone());

        tracing::debug!(
            booking_id = %commit.booking_id,
            transaction_ref = %transaction.transaction_ref,
            amount = %transaction.amount,
            "payment committed"
        );

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_booking(user_id: Uuid, hospital_id: Uuid) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id,
            hospital_id,
            resource_type: ResourceType::IcuBed,
            patient_age: Some(65.0),
            estimated_duration_hours: Decimal::from(24),
            payment_status: PaymentStatus::Pending,
            rapid_assistance_enabled: false,
            rapid_assistance_charge: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    fn commit_for(booking: &Booking, amount: Decimal, reference: &str) -> PaymentCommit {
        PaymentCommit {
            booking_id: booking.id,
            user_id: booking.user_id,
            hospital_id: booking.hospital_id,
            transaction_ref: reference.to_string(),
            amount,
            rapid_assistance_charge: Decimal::ZERO,
            committed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_debits_and_credits() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let booking = pending_booking(user_id, hospital_id);
        store.insert_booking(booking.clone());
        store.set_user_balance(user_id, Decimal::from(5000));

        let tx = store
            .commit_payment(commit_for(&booking, Decimal::from(1200), "TXNABC1"))
            .await
            .unwrap();

        assert_eq!(tx.previous_balance, Decimal::from(5000));
        assert_eq!(tx.new_balance, Decimal::from(3800));
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert_eq!(store.user_balance(user_id).await.unwrap(), Decimal::from(3800));
        assert_eq!(store.hospital_balance(hospital_id), Decimal::from(1200));

        let stored = store.booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_duplicate_ref_rejected_without_mutation() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let first = pending_booking(user_id, hospital_id);
        let second = pending_booking(user_id, hospital_id);
        store.insert_booking(first.clone());
        store.insert_booking(second.clone());
        store.set_user_balance(user_id, Decimal::from(10_000));

        store
            .commit_payment(commit_for(&first, Decimal::from(1000), "TXN1"))
            .await
            .unwrap();

        let err = store
            .commit_payment(commit_for(&second, Decimal::from(1000), "TXN1"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTransaction(_)));

        // Only one debit applied
        assert_eq!(store.user_balance(user_id).await.unwrap(), Decimal::from(9000));
        assert_eq!(store.transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_insufficient_balance_leaves_state_untouched() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let booking = pending_booking(user_id, hospital_id);
        store.insert_booking(booking.clone());
        store.set_user_balance(user_id, Decimal::from(100));

        let err = store
            .commit_payment(commit_for(&booking, Decimal::from(1200), "TXN2"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InsufficientBalance { .. }));

        assert_eq!(store.user_balance(user_id).await.unwrap(), Decimal::from(100));
        assert_eq!(store.hospital_balance(hospital_id), Decimal::ZERO);
        let stored = store.booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Pending);
        assert!(store.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_paid_booking_rejected() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let booking = pending_booking(user_id, hospital_id);
        store.insert_booking(booking.clone());
        store.set_user_balance(user_id, Decimal::from(10_000));

        store
            .commit_payment(commit_for(&booking, Decimal::from(1000), "TXN3"))
            .await
            .unwrap();

        let err = store
            .commit_payment(commit_for(&booking, Decimal::from(1000), "TXN4"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyPaid));
    }

    #[tokio::test]
    async fn test_rapid_charge_persisted_on_commit() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let booking = pending_booking(user_id, hospital_id);
        store.insert_booking(booking.clone());
        store.set_user_balance(user_id, Decimal::from(5000));

        let mut commit = commit_for(&booking, Decimal::from(1200), "TXN5");
        commit.rapid_assistance_charge = Decimal::from(200);
        store.commit_payment(commit).await.unwrap();

        let stored = store.booking(booking.id).await.unwrap().unwrap();
        assert!(stored.rapid_assistance_enabled);
        assert_eq!(stored.rapid_assistance_charge, Decimal::from(200));
    }
}
