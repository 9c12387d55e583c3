//! Response cache.
//!
//! In-memory TTL cache for fully formatted pipeline output. Keyed by
//! endpoint stage plus `(sport, market)`; a hit bypasses the pipeline
//! entirely and replays the stored payload with its original
//! timestamp. Entries are request-scoped snapshots — nothing else in
//! the system holds shared mutable state.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::MarketKind;

/// Which endpoint's output an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Raw,
    Best,
    Arb,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub stage: Stage,
    pub sport: String,
    pub market: MarketKind,
}

/// A cached response body plus the instant it was produced.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub payload: serde_json::Value,
    pub stored_at: DateTime<Utc>,
}

/// TTL cache over formatted responses.
pub struct ResponseCache {
    ttl: Duration,
    entries: RwLock<HashMap<CacheKey, CachedResponse>>,
}

impl ResponseCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a fresh entry. Expired entries are evicted and miss.
    pub async fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if Utc::now() - entry.stored_at < self.ttl => {
                    debug!(stage = ?key.stage, sport = %key.sport, market = %key.market, "Cache hit");
                    return Some(entry.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Entry exists but is stale — evict under the write lock.
        let mut entries = self.entries.write().await;
        entries.remove(key);
        debug!(stage = ?key.stage, sport = %key.sport, market = %key.market, "Cache entry expired");
        None
    }

    /// Store a freshly formatted payload. Returns the timestamp the
    /// wrapped response should carry.
    pub async fn put(&self, key: CacheKey, payload: serde_json::Value) -> DateTime<Utc> {
        let stored_at = Utc::now();
        let mut entries = self.entries.write().await;
        entries.insert(key, CachedResponse { payload, stored_at });
        stored_at
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
