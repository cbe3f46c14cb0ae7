use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

use crate::MarketSnapshot;

/// Cache key: (ticker, benchmark, lookback_days)
pub type SnapshotKey = (String, String, i64);

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Time-bounded store of refreshed snapshots.
pub struct SnapshotCache {
    entries: DashMap<SnapshotKey, CacheEntry<Arc<MarketSnapshot>>>,
    ttl_secs: i64,
}

impl SnapshotCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_secs,
        }
    }

    pub fn key(ticker: &str, benchmark: &str, lookback_days: i64) -> SnapshotKey {
        (ticker.to_uppercase(), benchmark.to_uppercase(), lookback_days)
    }

    /// Snapshot for `key` if it is younger than the TTL. Stale entries are evicted.
    pub fn get(&self, key: &SnapshotKey) -> Option<Arc<MarketSnapshot>> {
        {
            let entry = self.entries.get(key)?;
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < self.ttl_secs {
                tracing::debug!("Snapshot cache hit for {:?} (age {}s)", key, age);
                return Some(Arc::clone(&entry.data));
            }
        }

        tracing::debug!("Snapshot cache entry for {:?} expired", key);
        self.entries.remove(key);
        None
    }

    pub fn insert(&self, key: SnapshotKey, snapshot: Arc<MarketSnapshot>) {
        self.entries.insert(key, CacheEntry {
            data: snapshot,
            cached_at: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
