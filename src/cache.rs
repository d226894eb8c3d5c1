//! Short-lived in-memory cache of merged query results.
//!
//! Entries expire after a fixed TTL; an expired entry is treated as absent
//! and removed lazily on the next lookup of its key. Only non-empty merges
//! are stored (an empty hit would be indistinguishable from "not yet tried"
//! and would suppress future live attempts), and the key space is bounded
//! by distinct queries during a session, so there is no eviction beyond
//! expiry.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::models::{ProductRecord, QueryKey};

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub records: Vec<ProductRecord>,
    pub stored_at: Instant,
}

pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Records for a live (non-expired) entry, or `None`.
    pub async fn get(&self, key: &QueryKey) -> Option<Vec<ProductRecord>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                    return Some(entry.records.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: drop the stale entry before reporting a miss. The entry
        // may have been refreshed between the two locks.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.records.clone());
            }
            entries.remove(key);
        }
        None
    }

    /// Store a merged result set, replacing any previous entry for the key
    /// with a fresh timestamp.
    pub async fn put(&self, key: QueryKey, records: Vec<ProductRecord>) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                records,
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of live cached queries.
    pub async fn live_len(&self) -> usize {
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .count()
    }

    /// Count of cached records attributable to one source across all live
    /// entries. Reporting only.
    pub async fn count_by_source(&self, source_id: &str) -> usize {
        let entries = self.entries.read().await;
        entries
            .values()
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .flat_map(|entry| entry.records.iter())
            .filter(|record| record.source_id == source_id)
            .count()
    }
}
