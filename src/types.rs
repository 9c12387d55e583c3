//! Shared types for the SUREBET pipeline.
//!
//! These types form the data model used across all modules.
//! Each pipeline stage fully owns and constructs its output structures;
//! nothing here is mutated across a stage boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Market kind
// ---------------------------------------------------------------------------

/// The market a set of quotes was requested for.
///
/// Closed set — dispatch on market kind is a `match`, never a string
/// lookup into a dynamic map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketKind {
    #[serde(rename = "h2h")]
    H2h,
    #[serde(rename = "totals")]
    Totals,
    #[serde(rename = "spreads")]
    Spreads,
}

impl MarketKind {
    /// The query-parameter / path form the vendor API expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketKind::H2h => "h2h",
            MarketKind::Totals => "totals",
            MarketKind::Spreads => "spreads",
        }
    }
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MarketKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "h2h" => Ok(MarketKind::H2h),
            "totals" => Ok(MarketKind::Totals),
            "spreads" => Ok(MarketKind::Spreads),
            _ => Err(anyhow::anyhow!("Unknown market kind: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Quotes and line groups
// ---------------------------------------------------------------------------

/// One bookmaker's price for one outcome of a market.
///
/// Immutable once constructed by the normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub bookmaker: String,
    pub market: MarketKind,
    /// Decimal odds, > 1.0 for any quote worth taking.
    pub price: f64,
    /// Signed line. Present for totals/spreads, absent for h2h.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
    /// Team name for h2h/spreads, "Over"/"Under" for totals.
    pub outcome: String,
    /// Canonical `YYYY-MM-DD HH:MM:SS` form (UTC).
    pub last_update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// Grouping key for a line group, one variant per market kind.
///
/// Rendered to the legacy text forms at the serialization boundary:
/// `"default"`, `"45.5"`, `"3.5/-3.5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    H2h,
    Total { point: String },
    Spread { home: String, away: String },
}

impl GroupKey {
    pub fn total(point: f64) -> Self {
        GroupKey::Total { point: fmt_point(point) }
    }

    pub fn spread(home: f64, away: f64) -> Self {
        GroupKey::Spread {
            home: fmt_point(home),
            away: fmt_point(away),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::H2h => f.write_str("default"),
            GroupKey::Total { point } => f.write_str(point),
            GroupKey::Spread { home, away } => write!(f, "{home}/{away}"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Render a line value the way the legacy feed did: integral points keep
/// one decimal place (`3.0`, not `3`), fractional points print as-is.
fn fmt_point(p: f64) -> String {
    if p.fract() == 0.0 {
        format!("{p:.1}")
    } else {
        format!("{p}")
    }
}

/// All quotes on the same two outcomes at the same line, in vendor
/// payload order. Order is load-bearing: it drives the first-wins
/// tie-break in best-price selection.
#[derive(Debug, Clone, Serialize)]
pub struct LineGroup {
    pub key: GroupKey,
    pub quotes: Vec<Quote>,
}

/// A normalized game: identity fields plus its line groups.
#[derive(Debug, Clone, Serialize)]
pub struct Game {
    pub game_id: String,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    /// Canonical `YYYY-MM-DD HH:MM:SS` form (UTC).
    pub commence_time: String,
    pub market: MarketKind,
    pub lines: Vec<LineGroup>,
}

// ---------------------------------------------------------------------------
// Best-price selection output
// ---------------------------------------------------------------------------

/// The single best price found for one outcome slot of a line group,
/// with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct BestOutcomePrice {
    pub outcome: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
    pub bookmaker: String,
    pub last_update: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

impl BestOutcomePrice {
    pub fn from_quote(q: &Quote) -> Self {
        BestOutcomePrice {
            outcome: q.outcome.clone(),
            price: q.price,
            point: q.point,
            bookmaker: q.bookmaker.clone(),
            last_update: q.last_update.clone(),
            link: q.link.clone(),
            sid: q.sid.clone(),
        }
    }
}

/// Best prices for one line group. `outcome_a` is the home side (or
/// Over), `outcome_b` the away side (or Under); either may be unset
/// when no quote covered that slot.
#[derive(Debug, Clone, Serialize)]
pub struct BestLine {
    pub key: GroupKey,
    pub outcome_a: Option<BestOutcomePrice>,
    pub outcome_b: Option<BestOutcomePrice>,
}

/// A game annotated with the best price per outcome per line group.
#[derive(Debug, Clone, Serialize)]
pub struct BestPricedGame {
    pub game_id: String,
    pub sport: String,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: String,
    pub market: MarketKind,
    pub lines: Vec<BestLine>,
}

// ---------------------------------------------------------------------------
// Arbitrage results
// ---------------------------------------------------------------------------

/// A pair of stakes across the two outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StakeSplit {
    pub outcome_a: f64,
    pub outcome_b: f64,
}

/// Which bucket a line group's evaluation landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArbClass {
    /// Combined implied probability < 1: guaranteed profit.
    Arbitrage,
    /// Exactly 1: break-even.
    LowHold,
    /// In (1, 1.01): near-fair market, flagged for awareness.
    LowVig,
}

impl fmt::Display for ArbClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArbClass::Arbitrage => write!(f, "arbitrage"),
            ArbClass::LowHold => write!(f, "low-hold"),
            ArbClass::LowVig => write!(f, "low-vig"),
        }
    }
}

/// Computed stake allocation for one qualifying line group.
#[derive(Debug, Clone, Serialize)]
pub struct ArbBreakdown {
    /// Sum of the two implied probabilities.
    pub arb_value: f64,
    /// `-(arb_value - 1) * 100`, rounded to 3 decimals. Positive means
    /// guaranteed profit.
    pub arb_percentage: f64,
    /// Proportional split of the total stake.
    pub stakes: StakeSplit,
    /// Break-even hedge sized to win when outcome A lands. Arbitrage
    /// bucket only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedge_favoring_a: Option<StakeSplit>,
    /// Break-even hedge sized to win when outcome B lands. Arbitrage
    /// bucket only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedge_favoring_b: Option<StakeSplit>,
}

impl fmt::Display for ArbBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arb={:.3}% a={:.2} b={:.2}",
            self.arb_percentage, self.stakes.outcome_a, self.stakes.outcome_b,
        )
    }
}

/// One classified opportunity: game identity, the line it was found on,
/// the stake math, and the provenance of both best prices.
#[derive(Debug, Clone, Serialize)]
pub struct ArbitrageResult {
    pub game_id: String,
    pub sport: String,
    pub market: MarketKind,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: String,
    /// Rendered line key for totals/spreads; absent for h2h.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,
    pub arbitrage: ArbBreakdown,
    pub outcome_a: BestOutcomePrice,
    pub outcome_b: BestOutcomePrice,
}

/// The full classified output of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct ArbReport {
    pub arb_pairs: Vec<ArbitrageResult>,
    pub low_hold_pairs: Vec<ArbitrageResult>,
    pub low_vig_pairs: Vec<ArbitrageResult>,
    pub metadata: RunMetadata,
}

// ---------------------------------------------------------------------------
// Run metadata
// ---------------------------------------------------------------------------

/// Fetch-step context passed through the pipeline unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Vendor quota counter from the fetch response headers. `None`
    /// when the header was absent or unparseable. Observed here,
    /// acted on by the key ring.
    pub remaining_requests: Option<u32>,
    pub sport: String,
    pub market: MarketKind,
    pub bookmakers: Vec<String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for SUREBET.
#[derive(Debug, thiserror::Error)]
pub enum SurebetError {
    /// A single game record is missing a required field. Scoped to that
    /// game — the rest of the payload still normalizes.
    #[error("game record malformed: {0}")]
    DataShape(String),

    /// The vendor returned no games. An empty result, not a failure.
    #[error("vendor returned no games")]
    EmptyResponse,

    /// A non-positive or <= 1.0 decimal price reached the calculator.
    /// Scoped to one line group.
    #[error("invalid decimal price: {0}")]
    InvalidPrice(f64),

    /// The fetch collaborator failed outright. Surfaces as a service
    /// error; odds are never fabricated.
    #[error("upstream odds feed unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
