//! Bounded-concurrency batch reads with partial-failure tolerance
//!
//! Drives the read gateway over a sequence of listing ids while keeping at
//! most `concurrency_limit` calls in flight. A single failing or malformed id
//! becomes a per-id failure entry; it never aborts the batch and is never
//! silently skipped. Successful listings come back in the relative order of
//! their input ids.
//!
//! Cancellation is structural: the batch future owns its task set, so
//! dropping it (a consumer that lost interest) aborts every in-flight read
//! and discards any result that had not been collected yet.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::types::{Listing, ListingId};

use super::gateway::{ListingReadGateway, ReadError};
use super::ChainError;

/// Outcome of one batch fetch
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Successfully fetched listings, in the relative order of their input
    /// ids. Failed ids are omitted, not inserted as placeholders.
    pub listings: Vec<Listing>,

    /// Per-id failures. Exactly the input ids that did not resolve.
    pub failures: HashMap<ListingId, ReadError>,
}

impl FetchReport {
    /// True when every id in the batch resolved
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Batch reader over [`ListingReadGateway`]
pub struct ListingAggregator {
    gateway: Arc<ListingReadGateway>,

    /// Pool size used by [`ListingAggregator::fetch_listings`]
    default_limit: usize,
}

impl ListingAggregator {
    pub fn new(gateway: Arc<ListingReadGateway>, default_limit: usize) -> Self {
        Self {
            gateway,
            default_limit,
        }
    }

    /// Fetch a batch of listings with the configured concurrency limit
    pub async fn fetch_listings(&self, ids: &[ListingId]) -> FetchReport {
        self.fetch_listings_with_limit(ids, self.default_limit).await
    }

    /// Fetch a batch of listings with an explicit concurrency limit
    ///
    /// At most `limit` reads are outstanding at any time. A slow id holds one
    /// permit; ids queued behind the limit wait for a permit while
    /// already-dispatched ids proceed independently.
    pub async fn fetch_listings_with_limit(
        &self,
        ids: &[ListingId],
        limit: usize,
    ) -> FetchReport {
        let limit = limit.max(1);
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut tasks: JoinSet<(usize, ListingId, Result<Listing, ReadError>)> = JoinSet::new();

        for (position, &id) in ids.iter().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        // Pool semaphore closed; surfaced per id like any
                        // other read failure
                        return (
                            position,
                            id,
                            Err(ReadError::Call {
                                call: "getListing",
                                source: ChainError::Unreachable(
                                    "aggregator pool closed".to_string(),
                                ),
                            }),
                        );
                    }
                };

                (position, id, gateway.get_listing(id).await)
            });
        }

        // Collect by original input position so the success order matches
        // the input order regardless of completion order
        let mut slots: Vec<Option<Listing>> = vec![None; ids.len()];
        let mut failures = HashMap::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((position, _, Ok(listing))) => slots[position] = Some(listing),
                Ok((_, id, Err(error))) => {
                    log::warn!("Listing {} failed in batch: {}", id, error);
                    failures.insert(id, error);
                }
                Err(join_error) => {
                    // Task panicked; batch continues without that slot
                    log::warn!("Batch read task failed to join: {}", join_error);
                }
            }
        }

        let listings: Vec<Listing> = slots.into_iter().flatten().collect();
        log::debug!(
            "Batch fetch: {} ok, {} failed (limit {})",
            listings.len(),
            failures.len(),
            limit
        );

        FetchReport { listings, failures }
    }
}
