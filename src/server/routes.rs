//! Service API route handlers.
//!
//! All endpoints return JSON. Each 200 body is wrapped with the
//! timestamp its payload was produced at, so a cached replay shows its
//! real freshness. State is shared via `Arc<ServiceState>`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::cache::{CacheKey, ResponseCache, Stage};
use crate::pipeline::{best_price, classify, normalize};
use crate::types::MarketKind;
use crate::vendor::{FetchedOdds, OddsFeed};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServiceState {
    pub feed: Arc<dyn OddsFeed>,
    pub cache: ResponseCache,
    pub total_stake: f64,
}

pub type AppState = Arc<ServiceState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Envelope around every successful payload. `timestamp` reflects
/// cache freshness, not request time.
#[derive(Debug, Clone, Serialize)]
pub struct WrappedResponse {
    pub timestamp: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /odds/raw/:sport/:market
pub async fn get_raw_odds(
    State(state): State<AppState>,
    Path((sport, market)): Path<(String, String)>,
) -> Response {
    pipeline_response(state, Stage::Raw, sport, market).await
}

/// GET /odds/best/:sport/:market
pub async fn get_best_odds(
    State(state): State<AppState>,
    Path((sport, market)): Path<(String, String)>,
) -> Response {
    pipeline_response(state, Stage::Best, sport, market).await
}

/// GET /odds/arb/:sport/:market
pub async fn get_arb_pairs(
    State(state): State<AppState>,
    Path((sport, market)): Path<(String, String)>,
) -> Response {
    pipeline_response(state, Stage::Arb, sport, market).await
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Shared flow
// ---------------------------------------------------------------------------

/// Cache-first request flow: replay a fresh entry when one exists,
/// otherwise fetch, run the pipeline up to the requested stage, store,
/// and respond.
async fn pipeline_response(
    state: AppState,
    stage: Stage,
    sport: String,
    market: String,
) -> Response {
    let market: MarketKind = match market.parse() {
        Ok(kind) => kind,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: format!("unknown market kind: {market}"),
                }),
            )
                .into_response();
        }
    };

    let key = CacheKey {
        stage,
        sport: sport.clone(),
        market,
    };
    if let Some(entry) = state.cache.get(&key).await {
        return wrapped(entry.stored_at, entry.payload);
    }

    let fetched = match state.feed.fetch_odds(&sport, market).await {
        Ok(fetched) => fetched,
        Err(e) => {
            error!(sport = %sport, market = %market, error = %e, "Upstream fetch failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: format!("upstream odds feed unavailable: {e}"),
                }),
            )
                .into_response();
        }
    };

    let payload = build_payload(stage, &fetched, state.total_stake);
    let stored_at = state.cache.put(key, payload.clone()).await;
    wrapped(stored_at, payload)
}

/// Run the pipeline up to the requested stage and format the payload.
/// An empty vendor response yields an empty result, never a failure.
fn build_payload(stage: Stage, fetched: &FetchedOdds, total_stake: f64) -> serde_json::Value {
    let (games, metadata) = match normalize::normalize(fetched) {
        Ok(pair) => pair,
        Err(e) => {
            info!(sport = %fetched.sport, market = %fetched.market, error = %e, "No games in payload");
            (Vec::new(), normalize::run_metadata(fetched))
        }
    };

    match stage {
        Stage::Raw => serde_json::json!({ "games": games, "metadata": metadata }),
        Stage::Best => {
            let best = best_price::select_best_all(&games);
            serde_json::json!({ "games": best, "metadata": metadata })
        }
        Stage::Arb => {
            let best = best_price::select_best_all(&games);
            let report = classify::build_results(&best, total_stake, metadata);
            serde_json::json!(report)
        }
    }
}

fn wrapped(stored_at: chrono::DateTime<chrono::Utc>, data: serde_json::Value) -> Response {
    (
        StatusCode::OK,
        Json(WrappedResponse {
            timestamp: stored_at.to_rfc3339(),
            data,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
