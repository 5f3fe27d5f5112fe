//! Marketplace manager - Main integration layer
//!
//! Coordinates the session, read gateway, aggregator, submitter and query
//! cache behind one handle. The manager owns the process-wide singletons
//! (session state, cache); consumers go through its operations and never
//! mutate those internals directly.

use std::sync::Arc;

use crate::cache::{QueryCache, QueryKey, QueryValue};
use crate::chain::aggregator::{FetchReport, ListingAggregator};
use crate::chain::gateway::{ListingReadGateway, ReadError};
use crate::chain::submitter::{TransactionSubmitter, WriteError};
use crate::chain::LandContract;
use crate::config::{ConfigError, GlobalConfig};
use crate::session::{SessionError, WalletConnector, WalletSession, WalletSessionManager};
use crate::storage::{ProfileStore, StorageError};
use crate::types::{
    CreateListingParams, Listing, ListingId, PendingTransaction, ProfileType, TransactionState,
};

/// Errors that can occur in the marketplace manager
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Read error: {0}")]
    Read(#[from] ReadError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Main marketplace manager
pub struct MarketplaceManager {
    session: Arc<WalletSessionManager>,
    gateway: Arc<ListingReadGateway>,
    aggregator: ListingAggregator,
    submitter: TransactionSubmitter,
    cache: Arc<QueryCache>,
}

impl MarketplaceManager {
    /// Create a manager with the durable profile store under the configured
    /// data directory
    pub fn new(
        config: GlobalConfig,
        contract: Arc<dyn LandContract>,
        connector: Arc<dyn WalletConnector>,
    ) -> Result<Self, ManagerError> {
        let data_dir = config.resolved_data_dir()?;
        let profiles = ProfileStore::open(data_dir)?;
        Ok(Self::with_profile_store(config, contract, connector, profiles))
    }

    /// Create a manager around an existing profile store
    ///
    /// Used by tests with an in-memory store.
    pub fn with_profile_store(
        config: GlobalConfig,
        contract: Arc<dyn LandContract>,
        connector: Arc<dyn WalletConnector>,
        profiles: ProfileStore,
    ) -> Self {
        let cache = Arc::new(QueryCache::new());
        let session = Arc::new(WalletSessionManager::new(connector, profiles));
        let gateway = Arc::new(ListingReadGateway::new(Arc::clone(&contract)));
        let aggregator = ListingAggregator::new(Arc::clone(&gateway), config.read_concurrency);
        let submitter = TransactionSubmitter::new(
            contract,
            Arc::clone(&session),
            Arc::clone(&cache),
            config.confirmation.clone(),
        );

        Self {
            session,
            gateway,
            aggregator,
            submitter,
            cache,
        }
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Connect the wallet (see [`WalletSessionManager::connect`])
    pub async fn connect(&self) -> Result<WalletSession, ManagerError> {
        Ok(self.session.connect().await?)
    }

    /// Disconnect the wallet; the persisted profile row is kept
    pub async fn disconnect(&self) {
        self.session.disconnect().await;
    }

    /// Change the role of the connected address
    pub fn set_profile_type(&self, profile_type: ProfileType) -> Result<(), ManagerError> {
        Ok(self.session.set_profile_type(profile_type)?)
    }

    /// Snapshot of the current session
    pub fn current_session(&self) -> WalletSession {
        self.session.current()
    }

    /// Session manager handle, for subscribing to state changes
    pub fn session(&self) -> &WalletSessionManager {
        &self.session
    }

    /// Cache handle (reads only; mutation stays with the owning components)
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    // ========================================================================
    // Reads (cache-mediated)
    // ========================================================================

    /// Total number of listings, cached until a confirmed create invalidates
    pub async fn total_listings(&self) -> Result<u64, ManagerError> {
        let gateway = Arc::clone(&self.gateway);
        let value = self
            .cache
            .get_or_fetch(QueryKey::TotalListings, move || {
                let gateway = Arc::clone(&gateway);
                async move { gateway.total_listings().await.map(QueryValue::Count) }
            })
            .await?;

        value
            .into_count()
            .ok_or_else(|| ManagerError::Internal("unexpected cache shape for count".to_string()))
    }

    /// Ids of currently available listings, cached
    pub async fn available_listing_ids(&self) -> Result<Vec<ListingId>, ManagerError> {
        let gateway = Arc::clone(&self.gateway);
        let value = self
            .cache
            .get_or_fetch(QueryKey::AvailableListings, move || {
                let gateway = Arc::clone(&gateway);
                async move { gateway.available_listing_ids().await.map(QueryValue::Ids) }
            })
            .await?;

        value
            .into_ids()
            .ok_or_else(|| ManagerError::Internal("unexpected cache shape for ids".to_string()))
    }

    /// Ids of listings owned by `owner`, cached per address
    pub async fn owner_listing_ids(&self, owner: &str) -> Result<Vec<ListingId>, ManagerError> {
        let gateway = Arc::clone(&self.gateway);
        let owner_arg = owner.to_string();
        let value = self
            .cache
            .get_or_fetch(QueryKey::OwnerListings(owner.to_string()), move || {
                let gateway = Arc::clone(&gateway);
                let owner = owner_arg.clone();
                async move { gateway.owner_listing_ids(&owner).await.map(QueryValue::Ids) }
            })
            .await?;

        value
            .into_ids()
            .ok_or_else(|| ManagerError::Internal("unexpected cache shape for ids".to_string()))
    }

    /// One listing, cached until a confirmed lease invalidates it
    pub async fn listing(&self, id: ListingId) -> Result<Listing, ManagerError> {
        let gateway = Arc::clone(&self.gateway);
        let value = self
            .cache
            .get_or_fetch(QueryKey::Listing(id), move || {
                let gateway = Arc::clone(&gateway);
                async move { gateway.get_listing(id).await.map(QueryValue::Listing) }
            })
            .await?;

        value
            .into_listing()
            .ok_or_else(|| ManagerError::Internal("unexpected cache shape for listing".to_string()))
    }

    /// Fetch every currently available listing with bounded concurrency
    ///
    /// Partial failures stay per-id in the report; one bad listing never
    /// takes the batch down.
    pub async fn browse_available(&self) -> Result<FetchReport, ManagerError> {
        let ids = self.available_listing_ids().await?;
        Ok(self.aggregator.fetch_listings(&ids).await)
    }

    /// Fetch the connected wallet's own listings with bounded concurrency
    pub async fn my_listings(&self) -> Result<FetchReport, ManagerError> {
        let owner = self.session.connected_address()?;
        let ids = self.owner_listing_ids(&owner).await?;
        Ok(self.aggregator.fetch_listings(&ids).await)
    }

    /// Aggregator handle, for batches with caller-chosen ids or limits
    pub fn aggregator(&self) -> &ListingAggregator {
        &self.aggregator
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Submit a listing creation (see [`TransactionSubmitter::create_listing`])
    pub async fn create_listing(
        &self,
        params: &CreateListingParams,
    ) -> Result<PendingTransaction, ManagerError> {
        Ok(self.submitter.create_listing(params).await?)
    }

    /// Submit a lease request (see [`TransactionSubmitter::request_lease`])
    pub async fn request_lease(
        &self,
        listing_id: ListingId,
        duration: u64,
        offered_price: u128,
    ) -> Result<PendingTransaction, ManagerError> {
        Ok(self
            .submitter
            .request_lease(listing_id, duration, offered_price)
            .await?)
    }

    /// Wait for a submitted write to finalize
    pub async fn await_confirmation(&self, hash: &str) -> Result<TransactionState, ManagerError> {
        Ok(self.submitter.await_confirmation(hash).await?)
    }

    /// Tracked transaction for `hash`, if any
    pub fn pending_transaction(&self, hash: &str) -> Option<PendingTransaction> {
        self.submitter.get_pending(hash)
    }

    /// All tracked transactions, newest first
    pub fn pending_transactions(&self) -> Vec<PendingTransaction> {
        self.submitter.pending_transactions()
    }
}
