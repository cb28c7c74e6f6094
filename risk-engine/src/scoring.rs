//! Risk scoring engine
//!
//! Each behavioral signal contributes a bounded increment; the sum is
//! clamped to [0, 100]. Increasing any single signal can never decrease
//! the score.

use crate::ip::is_suspicious_ip;
use crate::types::{
    FraudAssessment, FraudFlag, FraudSignals, Recommendation, RiskAction, RiskLevel, RiskScore,
};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Signal weights and thresholds
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    /// Amount-to-average ratio that counts as a mild deviation
    pub deviation_ratio_mild: Decimal,

    /// Amount-to-average ratio that counts as an extreme deviation
    pub deviation_ratio_extreme: Decimal,

    /// Window transaction count that counts as elevated frequency
    pub frequency_elevated: u32,

    /// Window transaction count that counts as high frequency
    pub frequency_high: u32,

    /// Failure count that raises the multiple-failed-attempts flag
    pub failure_flag_threshold: u32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            deviation_ratio_mild: Decimal::from(2),
            deviation_ratio_extreme: Decimal::from(5),
            frequency_elevated: 5,
            frequency_high: 10,
            failure_flag_threshold: 3,
        }
    }
}

/// Fraud risk scorer
#[derive(Debug, Clone, Default)]
pub struct FraudScorer {
    config: ScorerConfig,
}

impl FraudScorer {
    /// Create scorer with default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Create scorer with explicit weights
    pub fn with_config(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Assess one payment attempt
    pub fn assess(&self, signals: &FraudSignals) -> FraudAssessment {
        let mut score = 0u32;
        let mut flags = BTreeSet::new();

        // Amount vs historical average
        if let Some(avg) = signals.historical_average {
            if avg > Decimal::ZERO {
                let ratio = signals.amount / avg;
                if ratio >= self.config.deviation_ratio_extreme {
                    score += 25;
                    flags.insert(FraudFlag::AmountDeviation);
                } else if ratio >= self.config.deviation_ratio_mild {
                    score += 10;
                }
            }
        }

        // Frequency in the rolling window
        if signals.transactions_in_window >= self.config.frequency_high {
            score += 20;
            flags.insert(FraudFlag::HighFrequency);
        } else if signals.transactions_in_window >= self.config.frequency_elevated {
            score += 10;
        }

        // Recent failures
        if signals.recent_failures >= self.config.failure_flag_threshold {
            score += 25;
            flags.insert(FraudFlag::MultipleFailedAttempts);
        } else if signals.recent_failures >= 1 {
            score += 10;
        }

        // Device and location novelty
        if !signals.known_device {
            score += 15;
            flags.insert(FraudFlag::NewDevice);
        }
        if !signals.known_location {
            score += 10;
            flags.insert(FraudFlag::NewLocation);
        }

        // IP reputation
        if is_suspicious_ip(&signals.ip_address) {
            score += 20;
            flags.insert(FraudFlag::SuspiciousIp);
        }

        let risk_score = RiskScore::new(score.min(100) as u8);
        let risk_level = risk_score.level();
        let recommendation = recommend(risk_level, &flags);

        tracing::debug!(
            score = risk_score.score(),
            level = %risk_level,
            ?recommendation,
            "fraud assessment complete"
        );

        FraudAssessment {
            risk_score,
            risk_level,
            fraud_flags: flags,
            recommendation,
            assessed_at: chrono::Utc::now(),
        }
    }
}

/// Derive the recommended action for a tier and flag set
///
/// The multiple-failed-attempts escalation takes precedence over the
/// tier-based default.
pub fn recommend(level: RiskLevel, flags: &BTreeSet<FraudFlag>) -> Recommendation {
    if flags.contains(&FraudFlag::MultipleFailedAttempts) {
        return Recommendation {
            action: RiskAction::Block,
            requires_manual_review: true,
        };
    }

    match level {
        RiskLevel::Critical | RiskLevel::High => Recommendation {
            action: RiskAction::Block,
            requires_manual_review: true,
        },
        RiskLevel::Medium => Recommendation {
            action: RiskAction::Challenge,
            requires_manual_review: false,
        },
        RiskLevel::Low | RiskLevel::Minimal => Recommendation {
            action: RiskAction::Allow,
            requires_manual_review: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_signals(amount: i64) -> FraudSignals {
        FraudSignals {
            amount: Decimal::from(amount),
            historical_average: Some(Decimal::from(amount)),
            transactions_in_window: 0,
            recent_failures: 0,
            known_device: true,
            known_location: true,
            ip_address: "103.4.145.20".to_string(),
        }
    }

    #[test]
    fn test_clean_attempt_is_minimal() {
        let scorer = FraudScorer::new();
        let assessment = scorer.assess(&clean_signals(1000));

        assert_eq!(assessment.risk_score.score(), 0);
        assert_eq!(assessment.risk_level, RiskLevel::Minimal);
        assert!(assessment.fraud_flags.is_empty());
        assert_eq!(assessment.recommendation.action, RiskAction::Allow);
        assert!(!assessment.recommendation.requires_manual_review);
    }

    #[test]
    fn test_extreme_amount_deviation_flags() {
        let scorer = FraudScorer::new();
        let mut signals = clean_signals(1000);
        signals.amount = Decimal::from(10_000);

        let assessment = scorer.assess(&signals);
        assert!(assessment.fraud_flags.contains(&FraudFlag::AmountDeviation));
        assert!(assessment.risk_score.score() >= 25);
    }

    #[test]
    fn test_no_history_contributes_nothing() {
        let scorer = FraudScorer::new();
        let mut signals = clean_signals(1000);
        signals.historical_average = None;

        assert_eq!(scorer.assess(&signals).risk_score.score(), 0);
    }

    #[test]
    fn test_failure_flag_escalates_to_block() {
        let scorer = FraudScorer::new();
        let mut signals = clean_signals(1000);
        signals.recent_failures = 3;

        let assessment = scorer.assess(&signals);
        // Score alone sits in a low tier, but the flag escalates
        assert!(assessment
            .fraud_flags
            .contains(&FraudFlag::MultipleFailedAttempts));
        assert_eq!(assessment.recommendation.action, RiskAction::Block);
        assert!(assessment.recommendation.requires_manual_review);
    }

    #[test]
    fn test_everything_wrong_is_critical() {
        let scorer = FraudScorer::new();
        let signals = FraudSignals {
            amount: Decimal::from(100_000),
            historical_average: Some(Decimal::from(500)),
            transactions_in_window: 20,
            recent_failures: 5,
            known_device: false,
            known_location: false,
            ip_address: "127.0.0.1".to_string(),
        };

        let assessment = scorer.assess(&signals);
        assert_eq!(assessment.risk_score.score(), 100);
        assert_eq!(assessment.risk_level, RiskLevel::Critical);
        assert_eq!(assessment.recommendation.action, RiskAction::Block);
    }

    #[test]
    fn test_recommend_tiers() {
        let none = BTreeSet::new();
        assert_eq!(recommend(RiskLevel::Minimal, &none).action, RiskAction::Allow);
        assert_eq!(recommend(RiskLevel::Low, &none).action, RiskAction::Allow);
        assert_eq!(
            recommend(RiskLevel::Medium, &none).action,
            RiskAction::Challenge
        );
        assert!(!recommend(RiskLevel::Medium, &none).requires_manual_review);
        assert_eq!(recommend(RiskLevel::High, &none).action, RiskAction::Block);
        assert!(recommend(RiskLevel::High, &none).requires_manual_review);
        assert_eq!(
            recommend(RiskLevel::Critical, &none).action,
            RiskAction::Block
        );
    }

    #[test]
    fn test_flag_overrides_low_tier() {
        let mut flags = BTreeSet::new();
        flags.insert(FraudFlag::MultipleFailedAttempts);

        let rec = recommend(RiskLevel::Minimal, &flags);
        assert_eq!(rec.action, RiskAction::Block);
        assert!(rec.requires_manual_review);
    }
}
