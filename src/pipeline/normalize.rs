//! Quote normalization.
//!
//! Converts the vendor's loosely-typed game records into market-aware
//! `Game`s: per market kind, each bookmaker's outcome pair is matched
//! up and grouped under the line it was quoted at. A record missing a
//! required field skips that game only; the rest of the payload still
//! normalizes.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{Game, GroupKey, LineGroup, MarketKind, Quote, RunMetadata, SurebetError};
use crate::vendor::FetchedOdds;

// ---------------------------------------------------------------------------
// Vendor record shapes (per-game typed parse)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawGame {
    id: String,
    home_team: String,
    away_team: String,
    /// ISO-8601 with `Z` suffix (UTC).
    commence_time: String,
    #[serde(default)]
    bookmakers: Vec<RawBookmaker>,
}

#[derive(Debug, Deserialize)]
struct RawBookmaker {
    title: String,
    last_update: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    sid: Option<String>,
    #[serde(default)]
    markets: Vec<RawMarketEntry>,
}

/// One market's quotes from one bookmaker. Requests ask for a single
/// market, so only the first entry matters.
#[derive(Debug, Deserialize)]
struct RawMarketEntry {
    #[serde(default)]
    outcomes: Vec<RawOutcome>,
}

#[derive(Debug, Deserialize)]
struct RawOutcome {
    name: String,
    price: f64,
    #[serde(default)]
    point: Option<f64>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a fetched payload into `Game`s plus the run metadata.
///
/// Malformed game records are skipped with a warning. An empty payload
/// signals `EmptyResponse` — the caller decides how to present that.
pub fn normalize(fetched: &FetchedOdds) -> Result<(Vec<Game>, RunMetadata), SurebetError> {
    if fetched.games.is_empty() {
        return Err(SurebetError::EmptyResponse);
    }

    let mut games = Vec::with_capacity(fetched.games.len());
    for (index, record) in fetched.games.iter().enumerate() {
        match normalize_game(record, &fetched.sport, fetched.market) {
            Ok(game) => games.push(game),
            Err(e) => warn!(index, error = %e, "Skipping malformed game record"),
        }
    }

    Ok((games, run_metadata(fetched)))
}

/// The fetch-step context carried through to the final output.
pub fn run_metadata(fetched: &FetchedOdds) -> RunMetadata {
    RunMetadata {
        remaining_requests: fetched.remaining_requests,
        sport: fetched.sport.clone(),
        market: fetched.market,
        bookmakers: fetched.bookmakers.clone(),
    }
}

fn normalize_game(
    record: &serde_json::Value,
    sport: &str,
    market: MarketKind,
) -> Result<Game, SurebetError> {
    let raw: RawGame =
        serde_json::from_value(record.clone()).map_err(|e| SurebetError::DataShape(e.to_string()))?;

    let commence_time = canonical_timestamp(&raw.commence_time)?;

    let mut lines: Vec<LineGroup> = Vec::new();
    for bm in &raw.bookmakers {
        let Some(entry) = bm.markets.first() else {
            continue;
        };
        let last_update = canonical_timestamp(&bm.last_update)?;

        let Some((key, first, second)) =
            pair_outcomes(market, &raw.home_team, &raw.away_team, &entry.outcomes)
        else {
            debug!(
                bookmaker = %bm.title,
                game_id = %raw.id,
                market = %market,
                "Dropping unpairable quote"
            );
            continue;
        };

        let a = quote_from(first, bm, &last_update, market);
        let b = quote_from(second, bm, &last_update, market);
        push_into_group(&mut lines, key, a, b);
    }

    Ok(Game {
        game_id: raw.id,
        sport: sport.to_string(),
        home_team: raw.home_team,
        away_team: raw.away_team,
        commence_time,
        market,
        lines,
    })
}

/// Match up a bookmaker's two covering outcomes and derive the group
/// key for the line they were quoted at. Returns `None` when either
/// side is missing or the pair violates the line invariant — such
/// quotes cannot be grouped and are dropped.
fn pair_outcomes<'a>(
    market: MarketKind,
    home_team: &str,
    away_team: &str,
    outcomes: &'a [RawOutcome],
) -> Option<(GroupKey, &'a RawOutcome, &'a RawOutcome)> {
    match market {
        MarketKind::H2h => {
            let home = outcomes.iter().find(|o| o.name == home_team)?;
            let away = outcomes.iter().find(|o| o.name == away_team)?;
            Some((GroupKey::H2h, home, away))
        }
        MarketKind::Totals => {
            let over = outcomes.iter().find(|o| o.name == "Over")?;
            let under = outcomes.iter().find(|o| o.name == "Under")?;
            let (over_pt, under_pt) = (over.point?, under.point?);
            // One shared threshold per group.
            if over_pt != under_pt {
                return None;
            }
            Some((GroupKey::total(over_pt), over, under))
        }
        MarketKind::Spreads => {
            let home = outcomes.iter().find(|o| o.name == home_team)?;
            let away = outcomes.iter().find(|o| o.name == away_team)?;
            let (home_pt, away_pt) = (home.point?, away.point?);
            // The two sides of a spread are additive inverses.
            if home_pt != -away_pt {
                return None;
            }
            Some((GroupKey::spread(home_pt, away_pt), home, away))
        }
    }
}

fn quote_from(
    outcome: &RawOutcome,
    bm: &RawBookmaker,
    last_update: &str,
    market: MarketKind,
) -> Quote {
    Quote {
        bookmaker: bm.title.clone(),
        market,
        price: outcome.price,
        point: outcome.point,
        outcome: outcome.name.clone(),
        last_update: last_update.to_string(),
        link: bm.link.clone(),
        sid: bm.sid.clone(),
    }
}

/// Append a bookmaker's quote pair to its line group, creating the
/// group on first sight. Insertion order is preserved end to end.
fn push_into_group(lines: &mut Vec<LineGroup>, key: GroupKey, a: Quote, b: Quote) {
    match lines.iter_mut().find(|g| g.key == key) {
        Some(group) => {
            group.quotes.push(a);
            group.quotes.push(b);
        }
        None => lines.push(LineGroup {
            key,
            quotes: vec![a, b],
        }),
    }
}

/// Normalize an ISO-8601 `Z`-suffixed timestamp to the canonical
/// `YYYY-MM-DD HH:MM:SS` text form (UTC).
pub(crate) fn canonical_timestamp(iso: &str) -> Result<String, SurebetError> {
    let dt = chrono::DateTime::parse_from_rfc3339(iso)
        .map_err(|e| SurebetError::DataShape(format!("bad timestamp {iso:?}: {e}")))?;
    Ok(dt
        .with_timezone(&chrono::Utc)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
