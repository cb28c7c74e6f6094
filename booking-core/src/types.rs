//! Core types for bookings and payments
//!
//! All types are designed for:
//! - Exact arithmetic (Decimal for money)
//! - Serde serialization (API boundary and audit payloads)
//! - Immutability of committed financial records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Hospital resource that can be booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ResourceType {
    /// ICU bed
    IcuBed,
    /// General cabin
    Cabin,
    /// Ambulance dispatch
    Ambulance,
    /// Oxygen cylinder supply
    OxygenCylinder,
    /// Blood unit reservation
    BloodUnit,
    /// Home sample collection visit
    HomeSampleCollection,
}

impl ResourceType {
    /// Stable name used in pricing keys and audit payloads
    pub fn name(&self) -> &'static str {
        match self {
            ResourceType::IcuBed => "icu_bed",
            ResourceType::Cabin => "cabin",
            ResourceType::Ambulance => "ambulance",
            ResourceType::OxygenCylinder => "oxygen_cylinder",
            ResourceType::BloodUnit => "blood_unit",
            ResourceType::HomeSampleCollection => "home_sample_collection",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Payment status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting payment
    Pending,
    /// Payment committed (terminal)
    Paid,
    /// Booking cancelled (terminal)
    Cancelled,
}

impl PaymentStatus {
    /// Whether this status may transition to `next`
    ///
    /// Only Pending → Paid and Pending → Cancelled are legal; terminal
    /// states never move backward.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Cancelled)
        )
    }

    /// Whether this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Cancelled)
    }
}

/// A requested resource reservation
///
/// `rapid_assistance_charge` is authoritative and set only by the payment
/// pipeline after eligibility validation; it is never taken from a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Booking ID
    pub id: Uuid,

    /// Owner of the booking
    pub user_id: Uuid,

    /// Hospital providing the resource
    pub hospital_id: Uuid,

    /// Booked resource type
    pub resource_type: ResourceType,

    /// Patient age in years, if recorded (real-valued)
    pub patient_age: Option<f64>,

    /// Estimated reservation duration in hours
    pub estimated_duration_hours: Decimal,

    /// Current payment status
    pub payment_status: PaymentStatus,

    /// Rapid assistance requested and validated on this booking
    pub rapid_assistance_enabled: bool,

    /// Rapid assistance charge applied (zero until charged)
    pub rapid_assistance_charge: Decimal,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the booking can still accept a payment
    pub fn is_payable(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
    }
}

/// Hospital pricing configuration for one resource type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HospitalPricing {
    /// Flat rate for the reservation, when set takes precedence
    pub flat_rate: Option<Decimal>,

    /// Hourly rate, used when no flat rate is configured
    pub hourly_rate: Decimal,
}

impl HospitalPricing {
    /// Base price for a reservation of the given duration
    pub fn base_price(&self, duration_hours: Decimal) -> Decimal {
        match self.flat_rate {
            Some(flat) => flat,
            None => self.hourly_rate * duration_hours,
        }
    }
}

/// Server-computed price breakdown for one payment attempt
///
/// Ephemeral: derived fresh on every attempt from stored state and never
/// accepted from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingQuote {
    /// Base reservation price
    pub base_price: Decimal,

    /// Platform service charge
    pub service_charge_amount: Decimal,

    /// Optional add-on charge (rapid assistance)
    pub add_on_charge: Decimal,

    /// Authoritative total the client must submit
    pub total_expected: Decimal,
}

/// Status of a transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Balance mutation applied, record final
    Completed,
    /// Attempt recorded but not committed
    Failed,
}

/// Immutable record of a completed or attempted payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID
    pub id: Uuid,

    /// Booking paid for
    pub booking_id: Uuid,

    /// Paying user
    pub user_id: Uuid,

    /// Client-supplied idempotency token, unique per user
    pub transaction_ref: String,

    /// Amount debited
    pub amount: Decimal,

    /// User balance before the debit
    pub previous_balance: Decimal,

    /// User balance after the debit
    pub new_balance: Decimal,

    /// Final status
    pub status: TransactionStatus,

    /// Commit timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Pending));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Cancelled.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn test_base_price_flat_rate_wins() {
        let pricing = HospitalPricing {
            flat_rate: Some(Decimal::from(800)),
            hourly_rate: Decimal::from(100),
        };
        assert_eq!(pricing.base_price(Decimal::from(24)), Decimal::from(800));
    }

    #[test]
    fn test_base_price_hourly() {
        let pricing = HospitalPricing {
            flat_rate: None,
            hourly_rate: Decimal::from(150),
        };
        assert_eq!(pricing.base_price(Decimal::from(4)), Decimal::from(600));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Paid.is_terminal());
        assert!(PaymentStatus::Cancelled.is_terminal());
    }
}
