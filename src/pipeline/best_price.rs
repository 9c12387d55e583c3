//! Best-price selection.
//!
//! Scans each line group and keeps, per outcome slot, the single
//! highest decimal price with its provenance. A slot changes hands
//! only on strict improvement, so the earliest-quoted bookmaker wins
//! exact ties — deterministic because the normalizer preserves vendor
//! payload order.

use tracing::debug;

use crate::types::{BestLine, BestOutcomePrice, BestPricedGame, Game, Quote};

/// Which side of the two-outcome market a quote covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    A,
    B,
}

/// Assign a quote to its outcome slot: home side (or Over) is slot A,
/// away side (or Under) is slot B. Quotes naming anything else (e.g. a
/// three-way draw) fit neither slot.
fn slot_of(quote: &Quote, game: &Game) -> Option<Slot> {
    match quote.market {
        crate::types::MarketKind::Totals => match quote.outcome.as_str() {
            "Over" => Some(Slot::A),
            "Under" => Some(Slot::B),
            _ => None,
        },
        _ => {
            if quote.outcome == game.home_team {
                Some(Slot::A)
            } else if quote.outcome == game.away_team {
                Some(Slot::B)
            } else {
                None
            }
        }
    }
}

/// Annotate one game with the best price per outcome per line group.
///
/// Line groups where neither slot resolved are discarded — no
/// opportunity can exist there.
pub fn select_best(game: &Game) -> BestPricedGame {
    let mut lines = Vec::with_capacity(game.lines.len());

    for group in &game.lines {
        let mut outcome_a: Option<BestOutcomePrice> = None;
        let mut outcome_b: Option<BestOutcomePrice> = None;

        for quote in &group.quotes {
            let Some(slot) = slot_of(quote, game) else {
                continue;
            };
            let current = match slot {
                Slot::A => &mut outcome_a,
                Slot::B => &mut outcome_b,
            };
            // Strict improvement only: equal prices keep the incumbent.
            let improves = current
                .as_ref()
                .map_or(true, |best| quote.price > best.price);
            if improves {
                *current = Some(BestOutcomePrice::from_quote(quote));
            }
        }

        if outcome_a.is_none() && outcome_b.is_none() {
            debug!(game_id = %game.game_id, key = %group.key, "Discarding empty line group");
            continue;
        }

        lines.push(BestLine {
            key: group.key.clone(),
            outcome_a,
            outcome_b,
        });
    }

    BestPricedGame {
        game_id: game.game_id.clone(),
        sport: game.sport.clone(),
        home_team: game.home_team.clone(),
        away_team: game.away_team.clone(),
        commence_time: game.commence_time.clone(),
        market: game.market,
        lines,
    }
}

/// Run best-price selection across a batch, dropping games left with
/// no resolvable line group at all.
pub fn select_best_all(games: &[Game]) -> Vec<BestPricedGame> {
    games
        .iter()
        .map(select_best)
        .filter(|g| !g.lines.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GroupKey, LineGroup, MarketKind};

    fn quote(bookmaker: &str, outcome: &str, price: f64, market: MarketKind) -> Quote {
        Quote {
            bookmaker: bookmaker.to_string(),
            market,
            price,
            point: None,
            outcome: outcome.to_string(),
            last_update: "2026-02-21 12:00:00".to_string(),
            link: None,
            sid: None,
        }
    }

    fn h2h_game(quotes: Vec<Quote>) -> Game {
        Game {
            game_id: "g1".to_string(),
            sport: "americanfootball_nfl".to_string(),
            home_team: "Chiefs".to_string(),
            away_team: "Eagles".to_string(),
            commence_time: "2026-02-22 23:30:00".to_string(),
            market: MarketKind::H2h,
            lines: vec![LineGroup {
                key: GroupKey::H2h,
                quotes,
            }],
        }
    }

    // -- Selection --

    #[test]
    fn test_highest_price_wins_per_slot() {
        let game = h2h_game(vec![
            quote("DraftKings", "Chiefs", 1.87, MarketKind::H2h),
            quote("DraftKings", "Eagles", 1.95, MarketKind::H2h),
            quote("FanDuel", "Chiefs", 1.92, MarketKind::H2h),
            quote("FanDuel", "Eagles", 1.90, MarketKind::H2h),
        ]);

        let best = select_best(&game);
        let line = &best.lines[0];
        let a = line.outcome_a.as_ref().unwrap();
        let b = line.outcome_b.as_ref().unwrap();
        assert_eq!(a.bookmaker, "FanDuel");
        assert!((a.price - 1.92).abs() < 1e-10);
        assert_eq!(b.bookmaker, "DraftKings");
        assert!((b.price - 1.95).abs() < 1e-10);
    }

    #[test]
    fn test_exact_tie_first_bookmaker_wins() {
        let game = h2h_game(vec![
            quote("DraftKings", "Chiefs", 1.90, MarketKind::H2h),
            quote("DraftKings", "Eagles", 1.90, MarketKind::H2h),
            quote("FanDuel", "Chiefs", 1.90, MarketKind::H2h),
            quote("FanDuel", "Eagles", 1.90, MarketKind::H2h),
        ]);

        let best = select_best(&game);
        let line = &best.lines[0];
        assert_eq!(line.outcome_a.as_ref().unwrap().bookmaker, "DraftKings");
        assert_eq!(line.outcome_b.as_ref().unwrap().bookmaker, "DraftKings");
    }

    #[test]
    fn test_selection_monotonic_under_reordering() {
        // Distinct prices: any order preserving relative price ordering
        // selects the same best.
        let forward = h2h_game(vec![
            quote("DraftKings", "Chiefs", 1.85, MarketKind::H2h),
            quote("FanDuel", "Chiefs", 1.95, MarketKind::H2h),
            quote("BetMGM", "Chiefs", 1.90, MarketKind::H2h),
        ]);
        let reversed = h2h_game(vec![
            quote("BetMGM", "Chiefs", 1.90, MarketKind::H2h),
            quote("FanDuel", "Chiefs", 1.95, MarketKind::H2h),
            quote("DraftKings", "Chiefs", 1.85, MarketKind::H2h),
        ]);

        let f = select_best(&forward);
        let r = select_best(&reversed);
        assert_eq!(f.lines[0].outcome_a.as_ref().unwrap().bookmaker, "FanDuel");
        assert_eq!(r.lines[0].outcome_a.as_ref().unwrap().bookmaker, "FanDuel");
    }

    #[test]
    fn test_provenance_carried_with_price() {
        let mut q = quote("DraftKings", "Chiefs", 1.87, MarketKind::H2h);
        q.link = Some("https://draftkings.example.com/game".to_string());
        q.sid = Some("dk-sid".to_string());
        let game = h2h_game(vec![q]);

        let best = select_best(&game);
        let a = best.lines[0].outcome_a.as_ref().unwrap();
        assert_eq!(a.link.as_deref(), Some("https://draftkings.example.com/game"));
        assert_eq!(a.sid.as_deref(), Some("dk-sid"));
        assert_eq!(a.last_update, "2026-02-21 12:00:00");
    }

    // -- Slot assignment --

    #[test]
    fn test_totals_slots_over_under() {
        let mut game = h2h_game(vec![
            quote("DraftKings", "Over", 1.91, MarketKind::Totals),
            quote("DraftKings", "Under", 1.89, MarketKind::Totals),
        ]);
        game.market = MarketKind::Totals;
        game.lines[0].key = GroupKey::total(45.5);

        let best = select_best(&game);
        let line = &best.lines[0];
        assert_eq!(line.outcome_a.as_ref().unwrap().outcome, "Over");
        assert_eq!(line.outcome_b.as_ref().unwrap().outcome, "Under");
    }

    #[test]
    fn test_unknown_outcome_label_fits_no_slot() {
        let game = h2h_game(vec![
            quote("DraftKings", "Draw", 3.40, MarketKind::H2h),
        ]);

        let best = select_best(&game);
        // Only quote fit neither slot, so the group resolved empty
        assert!(best.lines.is_empty());
    }

    // -- Discard rules --

    #[test]
    fn test_empty_group_discarded() {
        let game = h2h_game(vec![]);
        let best = select_best(&game);
        assert!(best.lines.is_empty());
    }

    #[test]
    fn test_one_sided_group_kept_at_this_stage() {
        let game = h2h_game(vec![quote("DraftKings", "Chiefs", 1.87, MarketKind::H2h)]);
        let best = select_best(&game);
        assert_eq!(best.lines.len(), 1);
        assert!(best.lines[0].outcome_a.is_some());
        assert!(best.lines[0].outcome_b.is_none());
    }

    #[test]
    fn test_select_best_all_drops_lineless_games() {
        let with_quotes = h2h_game(vec![
            quote("DraftKings", "Chiefs", 1.87, MarketKind::H2h),
            quote("DraftKings", "Eagles", 1.95, MarketKind::H2h),
        ]);
        let empty = h2h_game(vec![]);

        let all = select_best_all(&[with_quotes, empty]);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].game_id, "g1");
    }

    // -- Identity fields --

    #[test]
    fn test_game_identity_preserved() {
        let game = h2h_game(vec![
            quote("DraftKings", "Chiefs", 1.87, MarketKind::H2h),
            quote("DraftKings", "Eagles", 1.95, MarketKind::H2h),
        ]);
        let best = select_best(&game);
        assert_eq!(best.game_id, "g1");
        assert_eq!(best.sport, "americanfootball_nfl");
        assert_eq!(best.home_team, "Chiefs");
        assert_eq!(best.away_team, "Eagles");
        assert_eq!(best.commence_time, "2026-02-22 23:30:00");
        assert_eq!(best.market, MarketKind::H2h);
    }
}
