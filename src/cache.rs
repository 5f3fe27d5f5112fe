//! Query cache with write-driven invalidation and request coalescing
//!
//! Memoizes read results keyed by query. No TTL: reads are cheap to refresh
//! on demand, so entries live until a confirmed write invalidates them.
//! Invalidation removes the entry outright; nothing ever stale-patches a
//! cached value in place.
//!
//! Concurrent misses for the same key coalesce: one caller becomes the
//! leader and performs the underlying fetch, the rest wait on a watch
//! channel and receive the same result.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::{watch, Mutex};

use crate::chain::gateway::ReadError;
use crate::types::{Listing, ListingId};

/// Cache key, one variant per read query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    TotalListings,
    AvailableListings,
    OwnerListings(String),
    Listing(ListingId),
}

/// Cached result of a read query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Count(u64),
    Ids(Vec<ListingId>),
    Listing(Listing),
}

impl QueryValue {
    pub fn into_count(self) -> Option<u64> {
        match self {
            QueryValue::Count(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_ids(self) -> Option<Vec<ListingId>> {
        match self {
            QueryValue::Ids(ids) => Some(ids),
            _ => None,
        }
    }

    pub fn into_listing(self) -> Option<Listing> {
        match self {
            QueryValue::Listing(listing) => Some(listing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: QueryValue,

    /// Unix seconds; informational, entries do not expire on their own
    fetched_at: u64,
}

type Published = Option<Result<QueryValue, ReadError>>;

/// Process-wide read-result cache
///
/// Mutated only through its own operations; writers invalidate through the
/// transaction submitter on confirmation.
pub struct QueryCache {
    /// Read-mostly entry map
    entries: RwLock<HashMap<QueryKey, CacheEntry>>,

    /// In-flight fetches, for coalescing concurrent misses
    inflight: Mutex<HashMap<QueryKey, watch::Receiver<Published>>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key`, if present
    pub fn get(&self, key: &QueryKey) -> Option<QueryValue> {
        let entries = self.entries.read().unwrap();
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// True when an entry for `key` is present
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.read().unwrap().contains_key(key)
    }

    /// Store a value for `key`
    pub fn put(&self, key: QueryKey, value: QueryValue) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            key,
            CacheEntry {
                value,
                fetched_at: chrono::Utc::now().timestamp() as u64,
            },
        );
    }

    /// Remove the entry for `key`
    pub fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.entries.write().unwrap();
        if entries.remove(key).is_some() {
            log::debug!("Cache invalidated: {:?}", key);
        }
    }

    /// Remove every entry whose key matches `predicate`
    pub fn invalidate_matching(&self, predicate: impl Fn(&QueryKey) -> bool) {
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        let removed = before - entries.len();
        if removed > 0 {
            log::debug!("Cache invalidated {} matching entries", removed);
        }
    }

    /// Unix seconds at which the entry for `key` was stored
    pub fn fetched_at(&self, key: &QueryKey) -> Option<u64> {
        let entries = self.entries.read().unwrap();
        entries.get(key).map(|entry| entry.fetched_at)
    }

    /// Cached read with request coalescing
    ///
    /// Returns the cached value when present. On a miss, exactly one caller
    /// runs `fetch`; concurrent callers for the same key wait for its result
    /// instead of issuing redundant external reads. Successful results are
    /// cached; failures are returned to every waiter and not cached, so the
    /// next call retries.
    pub async fn get_or_fetch<F, Fut>(&self, key: QueryKey, fetch: F) -> Result<QueryValue, ReadError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<QueryValue, ReadError>>,
    {
        loop {
            if let Some(value) = self.get(&key) {
                return Ok(value);
            }

            let leader_tx = {
                let mut inflight = self.inflight.lock().await;

                // A leader may have finished between the cache check and
                // taking the inflight lock
                if let Some(value) = self.get(&key) {
                    return Ok(value);
                }

                if let Some(rx) = inflight.get(&key) {
                    let rx = rx.clone();
                    drop(inflight);
                    match self.await_leader(&key, rx).await {
                        Some(result) => return result,
                        // Leader dropped without publishing; take over
                        None => continue,
                    }
                }

                let (tx, rx) = watch::channel(None);
                inflight.insert(key.clone(), rx);
                tx
            };

            let result = fetch().await;

            if let Ok(value) = &result {
                self.put(key.clone(), value.clone());
            }
            self.inflight.lock().await.remove(&key);
            let _ = leader_tx.send(Some(result.clone()));

            return result;
        }
    }

    /// Wait for an in-flight leader to publish its result
    ///
    /// Returns `None` when the leader was dropped before publishing; the
    /// stale in-flight entry is cleaned up so the caller can retry as leader.
    async fn await_leader(
        &self,
        key: &QueryKey,
        mut rx: watch::Receiver<Published>,
    ) -> Option<Result<QueryValue, ReadError>> {
        let published = loop {
            let current = rx.borrow().clone();
            if current.is_some() {
                break current;
            }
            if rx.changed().await.is_err() {
                break rx.borrow().clone();
            }
        };

        if published.is_none() {
            let mut inflight = self.inflight.lock().await;
            let stale = inflight
                .get(key)
                .map(|entry| entry.same_channel(&rx))
                .unwrap_or(false);
            if stale {
                inflight.remove(key);
            }
        }

        published
    }
}
