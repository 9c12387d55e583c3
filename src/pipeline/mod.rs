//! The odds pipeline: normalize → select best prices → classify.
//!
//! Three pure stages, each constructing a fresh structure from the
//! previous stage's output. No I/O, no shared state — concurrent
//! callers need no coordination.

pub mod arbitrage;
pub mod best_price;
pub mod classify;
pub mod normalize;
