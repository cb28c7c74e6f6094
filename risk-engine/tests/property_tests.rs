//! Property-based tests for scoring invariants
//!
//! - Monotonicity: worsening any single signal never lowers the score
//! - Bounds: scores always land in [0, 100]
//! - Tier mapping is total and ordered

use proptest::prelude::*;
use risk_engine::{FraudScorer, FraudSignals, RiskLevel};
use rust_decimal::Decimal;

fn signals_strategy() -> impl Strategy<Value = FraudSignals> {
    (
        1u64..1_000_000,
        proptest::option::of(1u64..100_000),
        0u32..30,
        0u32..10,
        any::<bool>(),
        any::<bool>(),
        prop_oneof![
            Just("103.4.145.20".to_string()),
            Just("8.8.8.8".to_string()),
            Just("127.0.0.1".to_string()),
            Just("192.168.0.9".to_string()),
        ],
    )
        .prop_map(
            |(amount, avg, tx_count, failures, known_device, known_location, ip)| FraudSignals {
                amount: Decimal::from(amount),
                historical_average: avg.map(Decimal::from),
                transactions_in_window: tx_count,
                recent_failures: failures,
                known_device,
                known_location,
                ip_address: ip,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: score is always within [0, 100]
    #[test]
    fn prop_score_bounded(signals in signals_strategy()) {
        let scorer = FraudScorer::new();
        let assessment = scorer.assess(&signals);
        prop_assert!(assessment.risk_score.score() <= 100);
    }

    /// Property: raising the amount never lowers the score
    #[test]
    fn prop_amount_monotone(signals in signals_strategy(), bump in 1u64..1_000_000) {
        let scorer = FraudScorer::new();
        let base = scorer.assess(&signals).risk_score.score();

        let mut worse = signals;
        worse.amount += Decimal::from(bump);
        let bumped = scorer.assess(&worse).risk_score.score();

        prop_assert!(bumped >= base);
    }

    /// Property: more window transactions never lower the score
    #[test]
    fn prop_frequency_monotone(signals in signals_strategy(), bump in 1u32..20) {
        let scorer = FraudScorer::new();
        let base = scorer.assess(&signals).risk_score.score();

        let mut worse = signals;
        worse.transactions_in_window += bump;
        let bumped = scorer.assess(&worse).risk_score.score();

        prop_assert!(bumped >= base);
    }

    /// Property: more failures never lower the score
    #[test]
    fn prop_failures_monotone(signals in signals_strategy(), bump in 1u32..10) {
        let scorer = FraudScorer::new();
        let base = scorer.assess(&signals).risk_score.score();

        let mut worse = signals;
        worse.recent_failures += bump;
        let bumped = scorer.assess(&worse).risk_score.score();

        prop_assert!(bumped >= base);
    }

    /// Property: marking the device or location unknown never lowers the score
    #[test]
    fn prop_novelty_monotone(signals in signals_strategy()) {
        let scorer = FraudScorer::new();
        let base = scorer.assess(&signals).risk_score.score();

        let mut worse = signals;
        worse.known_device = false;
        worse.known_location = false;
        let bumped = scorer.assess(&worse).risk_score.score();

        prop_assert!(bumped >= base);
    }

    /// Property: tier ordering follows score ordering
    #[test]
    fn prop_tier_ordered(a in 0u8..=100, b in 0u8..=100) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(RiskLevel::from_score(lo) <= RiskLevel::from_score(hi));
    }
}
