//! Transaction submission and lifecycle tracking
//!
//! Encodes and submits state-changing calls, tracks each submission as a
//! [`PendingTransaction`], and drives confirmation polling. Cache entries a
//! confirmed write could affect are invalidated here, on confirmation only:
//! a merely `Submitted` write is not reflected anywhere in cached reads, and
//! callers wanting interim feedback consult the pending transaction they
//! hold. Writes are never retried automatically; resubmission is a distinct
//! user action with a new hash.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::time::{sleep, Instant};

use crate::cache::{QueryCache, QueryKey};
use crate::codec;
use crate::config::ConfirmationConfig;
use crate::session::WalletSessionManager;
use crate::types::{
    CreateListingParams, ListingId, PendingTransaction, TransactionKind, TransactionState, TxHash,
};

use super::{ChainError, LandContract, TxStatus};

/// Errors from write submission and confirmation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// A write was attempted without an active session; checked before any
    /// external call
    #[error("No wallet connected")]
    NotConnected,

    /// The value-bearing call lacked sufficient funds
    #[error("Insufficient funds for '{call}'")]
    InsufficientFunds { call: &'static str },

    /// The user rejected the signature request
    #[error("Write '{call}' rejected: {reason}")]
    Rejected { call: &'static str, reason: String },

    /// Submission failed at the provider or reverted on the ledger
    #[error("Write '{call}' failed: {source}")]
    Submit {
        call: &'static str,
        source: ChainError,
    },

    /// No confirmation observed within the configured bound
    #[error("Transaction {hash} not confirmed within {waited_ms}ms")]
    ConfirmationTimeout { hash: TxHash, waited_ms: u64 },

    /// The hash is not tracked by this submitter
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(TxHash),
}

impl WriteError {
    fn from_chain(call: &'static str, source: ChainError) -> Self {
        match source {
            ChainError::InsufficientFunds => WriteError::InsufficientFunds { call },
            ChainError::UserRejected(reason) => WriteError::Rejected { call, reason },
            other => WriteError::Submit {
                call,
                source: other,
            },
        }
    }
}

/// Submits writes and tracks their lifecycle
pub struct TransactionSubmitter {
    contract: Arc<dyn LandContract>,
    session: Arc<WalletSessionManager>,
    cache: Arc<QueryCache>,
    confirmation: ConfirmationConfig,

    /// Submitted transactions, keyed by hash. Entries transition once and
    /// are retained for UI feedback until explicitly forgotten.
    pending: Mutex<HashMap<TxHash, PendingTransaction>>,
}

impl TransactionSubmitter {
    pub fn new(
        contract: Arc<dyn LandContract>,
        session: Arc<WalletSessionManager>,
        cache: Arc<QueryCache>,
        confirmation: ConfirmationConfig,
    ) -> Self {
        Self {
            contract,
            session,
            cache,
            confirmation,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Submit a listing creation write
    ///
    /// Requires an active session. The price unit crosses the boundary as its
    /// contract code. Returns the tracked transaction in `Submitted` state;
    /// the new listing id only exists once the ledger confirms.
    pub async fn create_listing(
        &self,
        params: &CreateListingParams,
    ) -> Result<PendingTransaction, WriteError> {
        let from = self
            .session
            .connected_address()
            .map_err(|_| WriteError::NotConnected)?;

        let price_unit_code = codec::encode_price_unit(params.price_unit);

        let hash = self
            .contract
            .create_listing(
                &from,
                &params.title,
                &params.location,
                params.size,
                params.price,
                price_unit_code,
                &params.description,
                &params.features,
            )
            .await
            .map_err(|e| WriteError::from_chain("createListing", e))?;

        log::info!("createListing submitted: {}", hash);
        Ok(self.track(hash, TransactionKind::CreateListing, None))
    }

    /// Submit a lease request write
    ///
    /// Value-bearing: `offered_price` is transferred with the call, and an
    /// unfunded submission surfaces as
    /// [`WriteError::InsufficientFunds`], not a generic failure.
    pub async fn request_lease(
        &self,
        listing_id: ListingId,
        duration: u64,
        offered_price: u128,
    ) -> Result<PendingTransaction, WriteError> {
        let from = self
            .session
            .connected_address()
            .map_err(|_| WriteError::NotConnected)?;

        let hash = self
            .contract
            .request_lease(&from, listing_id, duration, offered_price)
            .await
            .map_err(|e| WriteError::from_chain("requestLease", e))?;

        log::info!("requestLease({}) submitted: {}", listing_id, hash);
        Ok(self.track(hash, TransactionKind::RequestLease, Some(listing_id)))
    }

    /// Poll the ledger until `hash` finalizes
    ///
    /// Resolves to the terminal state, or fails with
    /// [`WriteError::ConfirmationTimeout`] once the configured bound elapses.
    /// The bound and the poll cadence are policy parameters
    /// ([`ConfirmationConfig`]), not fixed by the domain. Transient status
    /// query failures are tolerated within the bound.
    ///
    /// On confirmation, the cache entries the write could affect are
    /// invalidated so the next read goes back to the ledger.
    pub async fn await_confirmation(&self, hash: &str) -> Result<TransactionState, WriteError> {
        let tracked = self
            .get_pending(hash)
            .ok_or_else(|| WriteError::UnknownTransaction(hash.to_string()))?;

        // Already finalized in an earlier call
        if tracked.state != TransactionState::Submitted {
            return Ok(tracked.state);
        }

        let started = Instant::now();
        let deadline = started + self.confirmation.timeout();

        loop {
            match self.contract.transaction_status(hash).await {
                Ok(TxStatus::Confirmed) => {
                    self.finalize(hash, TransactionState::Confirmed);
                    self.invalidate_for(&tracked);
                    return Ok(TransactionState::Confirmed);
                }
                Ok(TxStatus::Failed) => {
                    self.finalize(hash, TransactionState::Failed);
                    return Ok(TransactionState::Failed);
                }
                Ok(TxStatus::Pending) => {}
                Err(error) => {
                    log::warn!("Status poll for {} failed: {}", hash, error);
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(WriteError::ConfirmationTimeout {
                    hash: hash.to_string(),
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }

            sleep(self.confirmation.poll_interval().min(deadline - now)).await;
        }
    }

    /// Tracked transaction for `hash`, if any
    pub fn get_pending(&self, hash: &str) -> Option<PendingTransaction> {
        self.pending.lock().unwrap().get(hash).cloned()
    }

    /// All tracked transactions, newest first
    pub fn pending_transactions(&self) -> Vec<PendingTransaction> {
        let mut all: Vec<PendingTransaction> =
            self.pending.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        all
    }

    /// Drop a finalized transaction from tracking
    pub fn forget(&self, hash: &str) {
        self.pending.lock().unwrap().remove(hash);
    }

    fn track(
        &self,
        hash: TxHash,
        kind: TransactionKind,
        related_listing_id: Option<ListingId>,
    ) -> PendingTransaction {
        let tx = PendingTransaction {
            hash: hash.clone(),
            kind,
            state: TransactionState::Submitted,
            related_listing_id,
            submitted_at: chrono::Utc::now().timestamp() as u64,
        };

        self.pending.lock().unwrap().insert(hash, tx.clone());
        tx
    }

    fn finalize(&self, hash: &str, state: TransactionState) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(tx) = pending.get_mut(hash) {
            tx.state = state;
        }
        log::info!("Transaction {} finalized: {:?}", hash, state);
    }

    /// Invalidate the cache entries a confirmed write could affect
    fn invalidate_for(&self, tx: &PendingTransaction) {
        match tx.kind {
            TransactionKind::CreateListing => {
                self.cache.invalidate(&QueryKey::TotalListings);
                self.cache.invalidate(&QueryKey::AvailableListings);
            }
            TransactionKind::RequestLease => {
                if let Some(id) = tx.related_listing_id {
                    self.cache.invalidate(&QueryKey::Listing(id));
                }
            }
        }
    }
}
