//! Arbitrage stake math.
//!
//! Given the two best prices covering a market, computes implied
//! probabilities, the combined arb value, and — when the market is
//! beatable or close to it — the stake allocation: a proportional
//! split that locks the same return on either outcome, plus the two
//! single-side hedge variants.

use crate::types::{ArbBreakdown, ArbClass, StakeSplit, SurebetError};

/// Default total stake to allocate across the two outcomes, in
/// monetary units.
pub const DEFAULT_TOTAL_STAKE: f64 = 1000.0;

/// Markets with a combined implied probability at or above this are
/// not worth reporting.
const LOW_VIG_CEILING: f64 = 1.01;

/// A classified, fully sized evaluation of one price pair.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub class: ArbClass,
    pub breakdown: ArbBreakdown,
}

/// Evaluate a pair of decimal prices against a total stake.
///
/// Returns `Ok(None)` when the market holds too much vig to report.
/// Prices at or below 1.0 (which would imply certainty or worse) are
/// rejected with `InvalidPrice` — the caller drops that line group
/// and continues.
pub fn evaluate(
    price_a: f64,
    price_b: f64,
    total_stake: f64,
) -> Result<Option<Evaluation>, SurebetError> {
    for price in [price_a, price_b] {
        if !price.is_finite() || price <= 1.0 {
            return Err(SurebetError::InvalidPrice(price));
        }
    }
    debug_assert!(total_stake > 0.0);

    let prob_a = 1.0 / price_a;
    let prob_b = 1.0 / price_b;
    let arb_value = prob_a + prob_b;

    if arb_value >= LOW_VIG_CEILING {
        return Ok(None);
    }

    // Exact break-even forms its own bucket; 2.00/2.00-style pairs
    // land on 1.0 precisely.
    #[allow(clippy::float_cmp)]
    let class = if arb_value < 1.0 {
        ArbClass::Arbitrage
    } else if arb_value == 1.0 {
        ArbClass::LowHold
    } else {
        ArbClass::LowVig
    };

    let stakes = StakeSplit {
        outcome_a: round2(total_stake * prob_a / arb_value),
        outcome_b: round2(total_stake * prob_b / arb_value),
    };

    // Hedge variants only make sense when the market is beatable.
    let (hedge_favoring_a, hedge_favoring_b) = if class == ArbClass::Arbitrage {
        // Favor A: stake on B sized to return the full stake if B
        // lands, everything else rides on A.
        let b_cover = total_stake / price_b;
        let favoring_a = StakeSplit {
            outcome_a: round2(total_stake - b_cover),
            outcome_b: round2(b_cover),
        };
        let a_cover = total_stake / price_a;
        let favoring_b = StakeSplit {
            outcome_a: round2(a_cover),
            outcome_b: round2(total_stake - a_cover),
        };
        (Some(favoring_a), Some(favoring_b))
    } else {
        (None, None)
    };

    Ok(Some(Evaluation {
        class,
        breakdown: ArbBreakdown {
            arb_value,
            arb_percentage: round3(-(arb_value - 1.0) * 100.0),
            stakes,
            hedge_favoring_a,
            hedge_favoring_b,
        },
    }))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Classification --

    #[test]
    fn test_arbitrage_pair_classified() {
        // 1/2.10 + 1/2.05 = 0.96400 < 1
        let eval = evaluate(2.10, 2.05, 1000.0).unwrap().unwrap();
        assert_eq!(eval.class, ArbClass::Arbitrage);
        assert!((eval.breakdown.arb_value - 0.9639953542).abs() < 1e-9);
        assert!((eval.breakdown.arb_percentage - 3.6).abs() < 1e-9);
    }

    #[test]
    fn test_low_hold_exact_break_even() {
        let eval = evaluate(2.00, 2.00, 1000.0).unwrap().unwrap();
        assert_eq!(eval.class, ArbClass::LowHold);
        assert_eq!(eval.breakdown.arb_value, 1.0);
        assert_eq!(eval.breakdown.arb_percentage, 0.0);
        assert_eq!(eval.breakdown.stakes.outcome_a, 500.0);
        assert_eq!(eval.breakdown.stakes.outcome_b, 500.0);
    }

    #[test]
    fn test_low_vig_band() {
        // 1/1.98 + 1/2.01 = 1.0025... in (1, 1.01)
        let eval = evaluate(1.98, 2.01, 1000.0).unwrap().unwrap();
        assert_eq!(eval.class, ArbClass::LowVig);
        assert!(eval.breakdown.arb_value > 1.0);
        assert!(eval.breakdown.arb_value < 1.01);
        assert!(eval.breakdown.arb_percentage < 0.0);
    }

    #[test]
    fn test_high_vig_discarded() {
        // 1/1.80 + 1/1.80 = 1.111... >= 1.01
        let result = evaluate(1.80, 1.80, 1000.0).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_just_above_low_vig_ceiling_discarded() {
        // 1/1.96 + 1/2.00 = 1.010204... — barely over the ceiling
        let result = evaluate(1.96, 2.00, 1000.0).unwrap();
        assert!(result.is_none());
    }

    // -- Stake split --

    #[test]
    fn test_proportional_split_values() {
        let eval = evaluate(2.10, 2.05, 1000.0).unwrap().unwrap();
        let stakes = eval.breakdown.stakes;
        assert!((stakes.outcome_a - 493.98).abs() < 0.01);
        assert!((stakes.outcome_b - 506.02).abs() < 0.01);
    }

    #[test]
    fn test_split_sums_to_total_stake() {
        for (a, b) in [(2.10, 2.05), (2.00, 2.00), (1.98, 2.01), (3.50, 1.45)] {
            if let Some(eval) = evaluate(a, b, 1000.0).unwrap() {
                let sum = eval.breakdown.stakes.outcome_a + eval.breakdown.stakes.outcome_b;
                assert!(
                    (sum - 1000.0).abs() < 0.02,
                    "split for ({a}, {b}) sums to {sum}"
                );
            }
        }
    }

    #[test]
    fn test_split_scales_with_stake() {
        let eval = evaluate(2.10, 2.05, 500.0).unwrap().unwrap();
        let sum = eval.breakdown.stakes.outcome_a + eval.breakdown.stakes.outcome_b;
        assert!((sum - 500.0).abs() < 0.02);
    }

    #[test]
    fn test_equal_payout_on_either_outcome() {
        // The proportional split returns the same amount whichever
        // outcome lands.
        let eval = evaluate(2.10, 2.05, 1000.0).unwrap().unwrap();
        let payout_a = eval.breakdown.stakes.outcome_a * 2.10;
        let payout_b = eval.breakdown.stakes.outcome_b * 2.05;
        assert!((payout_a - payout_b).abs() < 0.1);
        // And the payout beats the stake: that's the arbitrage.
        assert!(payout_a > 1000.0);
    }

    // -- Hedge variants --

    #[test]
    fn test_hedges_present_for_arbitrage() {
        let eval = evaluate(2.10, 2.05, 1000.0).unwrap().unwrap();
        let fa = eval.breakdown.hedge_favoring_a.unwrap();
        let fb = eval.breakdown.hedge_favoring_b.unwrap();

        // Favoring A: B side covers the full stake if B lands.
        assert!((fa.outcome_b - 487.80).abs() < 0.01);
        assert!((fa.outcome_a - 512.20).abs() < 0.01);
        assert!((fa.outcome_b * 2.05 - 1000.0).abs() < 0.1);

        // Favoring B: A side covers the full stake if A lands.
        assert!((fb.outcome_a - 476.19).abs() < 0.01);
        assert!((fb.outcome_b - 523.81).abs() < 0.01);
        assert!((fb.outcome_a * 2.10 - 1000.0).abs() < 0.1);
    }

    #[test]
    fn test_hedges_absent_for_low_hold_and_low_vig() {
        let low_hold = evaluate(2.00, 2.00, 1000.0).unwrap().unwrap();
        assert!(low_hold.breakdown.hedge_favoring_a.is_none());
        assert!(low_hold.breakdown.hedge_favoring_b.is_none());

        let low_vig = evaluate(1.98, 2.01, 1000.0).unwrap().unwrap();
        assert!(low_vig.breakdown.hedge_favoring_a.is_none());
        assert!(low_vig.breakdown.hedge_favoring_b.is_none());
    }

    // -- Invalid prices --

    #[test]
    fn test_rejects_non_positive_price() {
        assert!(matches!(
            evaluate(0.0, 2.0, 1000.0),
            Err(SurebetError::InvalidPrice(_))
        ));
        assert!(matches!(
            evaluate(2.0, -1.5, 1000.0),
            Err(SurebetError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_rejects_price_at_or_below_one() {
        assert!(matches!(
            evaluate(1.0, 2.0, 1000.0),
            Err(SurebetError::InvalidPrice(_))
        ));
        assert!(matches!(
            evaluate(2.0, 0.95, 1000.0),
            Err(SurebetError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_rejects_non_finite_price() {
        assert!(evaluate(f64::NAN, 2.0, 1000.0).is_err());
        assert!(evaluate(f64::INFINITY, 2.0, 1000.0).is_err());
    }

    // -- Rounding --

    #[test]
    fn test_percentage_rounded_to_three_decimals() {
        // 1/2.11 + 1/2.04 = 0.963983... → 3.601684...% → 3.602
        let eval = evaluate(2.11, 2.04, 1000.0).unwrap().unwrap();
        let pct = eval.breakdown.arb_percentage;
        assert_eq!((pct * 1000.0).round() / 1000.0, pct);
    }

    #[test]
    fn test_stakes_rounded_to_cents() {
        let eval = evaluate(2.10, 2.05, 1000.0).unwrap().unwrap();
        let a = eval.breakdown.stakes.outcome_a;
        assert_eq!((a * 100.0).round() / 100.0, a);
    }
}
