//! HTTP service — Axum server exposing the odds pipeline.
//!
//! Three endpoints, one per pipeline stage, plus a health probe.
//! CORS enabled (GET only) for local development.

pub mod routes;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;

use routes::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/odds/raw/:sport/:market", get(routes::get_raw_odds))
        .route("/odds/best/:sport/:market", get(routes::get_best_odds))
        .route("/odds/arb/:sport/:market", get(routes::get_arb_pairs))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
