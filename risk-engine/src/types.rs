//! Core types for risk engine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Risk score (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    /// Create new risk score, clamped to 100
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Get raw score
    pub fn score(&self) -> u8 {
        self.0
    }

    /// Risk level for this score
    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_score(self.0)
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Risk tier
///
/// Band boundaries are half-open except the closed top:
/// Minimal [0,20), Low [20,50), Medium [50,70), High [70,90), Critical [90,100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Minimal risk
    Minimal,
    /// Low risk
    Low,
    /// Medium risk
    Medium,
    /// High risk
    High,
    /// Critical risk
    Critical,
}

impl RiskLevel {
    /// Tier for a raw score
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=19 => RiskLevel::Minimal,
            20..=49 => RiskLevel::Low,
            50..=69 => RiskLevel::Medium,
            70..=89 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    /// Stable tag used in responses and audit payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl From<RiskScore> for RiskLevel {
    fn from(score: RiskScore) -> Self {
        score.level()
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Behavioral flag raised during scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FraudFlag {
    /// Amount deviates sharply from the user's historical average
    AmountDeviation,
    /// Unusually many transactions in the rolling window
    HighFrequency,
    /// Several recent failed attempts
    MultipleFailedAttempts,
    /// Payment from a device the user has never used
    NewDevice,
    /// Payment from a location the user has never used
    NewLocation,
    /// Source IP in a private/loopback/reserved range
    SuspiciousIp,
}

impl FraudFlag {
    /// Stable tag string
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudFlag::AmountDeviation => "amount-deviation",
            FraudFlag::HighFrequency => "high-frequency",
            FraudFlag::MultipleFailedAttempts => "multiple-failed-attempts",
            FraudFlag::NewDevice => "new-device",
            FraudFlag::NewLocation => "new-location",
            FraudFlag::SuspiciousIp => "suspicious-ip",
        }
    }
}

/// Action the pipeline should take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskAction {
    /// Commit normally
    Allow,
    /// Commit, but flag for additional verification
    Challenge,
    /// Refuse the payment
    Block,
}

/// Recommendation derived from tier and flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Action to take
    pub action: RiskAction,

    /// Whether a human should review the attempt
    pub requires_manual_review: bool,
}

/// Behavioral signals for one payment attempt
#[derive(Debug, Clone)]
pub struct FraudSignals {
    /// Amount of the attempt
    pub amount: Decimal,

    /// Historical average successful amount, if any history exists
    pub historical_average: Option<Decimal>,

    /// Attempts by this user inside the rolling window
    pub transactions_in_window: u32,

    /// Failed attempts by this user inside the rolling window
    pub recent_failures: u32,

    /// Device has been seen for this user before
    pub known_device: bool,

    /// Location has been seen for this user before
    pub known_location: bool,

    /// Source IP address of the request
    pub ip_address: String,
}

/// Risk assessment result
///
/// Ephemeral: attached to the attempt for audit purposes, never stored as
/// mutable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudAssessment {
    /// Risk score
    pub risk_score: RiskScore,

    /// Risk tier
    pub risk_level: RiskLevel,

    /// Flags raised
    pub fraud_flags: BTreeSet<FraudFlag>,

    /// Derived recommendation
    pub recommendation: Recommendation,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}
