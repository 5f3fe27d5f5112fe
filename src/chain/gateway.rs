//! Read gateway over the contract call surface
//!
//! One external call per invocation, normalized to domain types or a typed
//! [`ReadError`]. No retries happen here: retry cadence belongs to callers,
//! and layering it into the gateway would hide how often the provider is
//! actually failing.

use std::sync::Arc;

use crate::types::{Listing, ListingId};

use super::transform::{transform_listing, TransformError};
use super::{ChainError, LandContract};

/// Errors from a single normalized read
///
/// `Clone` because a coalesced read (see the cache module) fans one result
/// out to every waiter, failures included.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// The underlying contract call failed
    #[error("Read '{call}' failed: {source}")]
    Call {
        /// Contract call name, for user-facing messages
        call: &'static str,
        source: ChainError,
    },

    /// The ledger returned a payload that violates the expected shape
    #[error("Malformed listing {id}: {source}")]
    Malformed {
        id: ListingId,
        source: TransformError,
    },
}

impl ReadError {
    fn call(call: &'static str, source: ChainError) -> Self {
        ReadError::Call { call, source }
    }
}

/// Issues individual read calls against the contract
pub struct ListingReadGateway {
    contract: Arc<dyn LandContract>,
}

impl ListingReadGateway {
    pub fn new(contract: Arc<dyn LandContract>) -> Self {
        Self { contract }
    }

    /// Total number of listings ever created
    pub async fn total_listings(&self) -> Result<u64, ReadError> {
        let total = self
            .contract
            .get_total_listings()
            .await
            .map_err(|e| ReadError::call("getTotalListings", e))?;

        log::debug!("getTotalListings -> {}", total);
        Ok(total)
    }

    /// Ids of listings currently open for lease, in contract order
    pub async fn available_listing_ids(&self) -> Result<Vec<ListingId>, ReadError> {
        let ids = self
            .contract
            .get_available_listings()
            .await
            .map_err(|e| ReadError::call("getAvailableListings", e))?;

        log::debug!("getAvailableListings -> {} ids", ids.len());
        Ok(ids)
    }

    /// Ids of listings owned by `owner`, in contract order
    pub async fn owner_listing_ids(&self, owner: &str) -> Result<Vec<ListingId>, ReadError> {
        let ids = self
            .contract
            .get_owner_listings(owner)
            .await
            .map_err(|e| ReadError::call("getOwnerListings", e))?;

        log::debug!("getOwnerListings({}) -> {} ids", owner, ids.len());
        Ok(ids)
    }

    /// Fetch and decode one listing
    ///
    /// Decoding failures surface as [`ReadError::Malformed`] naming the id;
    /// a listing with an unknown status code is never silently skipped or
    /// defaulted.
    pub async fn get_listing(&self, id: ListingId) -> Result<Listing, ReadError> {
        let raw = self
            .contract
            .get_listing(id)
            .await
            .map_err(|e| ReadError::call("getListing", e))?;

        transform_listing(id, &raw).map_err(|source| ReadError::Malformed { id, source })
    }
}
