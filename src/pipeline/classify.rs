//! Result classification.
//!
//! Walks every line group of every best-priced game, runs the stake
//! calculator on the two best prices, and routes each qualifying line
//! into its bucket. Lines missing either side are skipped — nothing to
//! split a stake across. Bucket order follows input game/line order.

use tracing::{debug, warn};

use super::arbitrage;
use crate::types::{
    ArbBreakdown, ArbClass, ArbReport, ArbitrageResult, BestOutcomePrice, BestPricedGame,
    GroupKey, RunMetadata,
};

/// Classify all best-priced games into arb / low-hold / low-vig
/// buckets. Metadata is copied through unchanged.
pub fn build_results(
    games: &[BestPricedGame],
    total_stake: f64,
    metadata: RunMetadata,
) -> ArbReport {
    let mut report = ArbReport {
        arb_pairs: Vec::new(),
        low_hold_pairs: Vec::new(),
        low_vig_pairs: Vec::new(),
        metadata,
    };

    for game in games {
        for line in &game.lines {
            let (Some(a), Some(b)) = (&line.outcome_a, &line.outcome_b) else {
                debug!(game_id = %game.game_id, key = %line.key, "Skipping one-sided line");
                continue;
            };

            let evaluation = match arbitrage::evaluate(a.price, b.price, total_stake) {
                Ok(Some(e)) => e,
                Ok(None) => continue,
                Err(e) => {
                    // Scoped to this line group; the rest of the run
                    // still classifies.
                    warn!(game_id = %game.game_id, key = %line.key, error = %e, "Dropping line group");
                    continue;
                }
            };

            let result = to_result(game, &line.key, a, b, evaluation.breakdown);
            match evaluation.class {
                ArbClass::Arbitrage => report.arb_pairs.push(result),
                ArbClass::LowHold => report.low_hold_pairs.push(result),
                ArbClass::LowVig => report.low_vig_pairs.push(result),
            }
        }
    }

    report
}

fn to_result(
    game: &BestPricedGame,
    key: &GroupKey,
    a: &BestOutcomePrice,
    b: &BestOutcomePrice,
    breakdown: ArbBreakdown,
) -> ArbitrageResult {
    let point = match key {
        GroupKey::H2h => None,
        key => Some(key.to_string()),
    };

    ArbitrageResult {
        game_id: game.game_id.clone(),
        sport: game.sport.clone(),
        market: game.market,
        home_team: game.home_team.clone(),
        away_team: game.away_team.clone(),
        commence_time: game.commence_time.clone(),
        point,
        arbitrage: breakdown,
        outcome_a: a.clone(),
        outcome_b: b.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
