//! Ledger contract boundary
//!
//! The land-listing contract is an external collaborator reached through the
//! fixed call surface below. Concrete transports (JSON-RPC provider, test
//! doubles) implement [`LandContract`]; the core only ever sees normalized
//! results or typed errors.

pub mod aggregator;
pub mod gateway;
pub mod submitter;
pub mod transform;

use async_trait::async_trait;

use crate::types::{ListingId, TxHash};

pub use aggregator::{FetchReport, ListingAggregator};
pub use gateway::{ListingReadGateway, ReadError};
pub use submitter::{TransactionSubmitter, WriteError};
pub use transform::{transform_listing, TransformError};

/// Errors surfaced by a contract transport
///
/// Variants carry provider-side detail as strings; the transport is opaque to
/// the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The provider endpoint could not be reached
    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    /// The call reverted on the ledger
    #[error("Call reverted: {0}")]
    Reverted(String),

    /// A value-bearing write was submitted without sufficient funds
    #[error("Insufficient funds for value-bearing call")]
    InsufficientFunds,

    /// The user rejected the signature request in the connector
    #[error("Signature rejected: {0}")]
    UserRejected(String),
}

/// Finalization status of a submitted transaction, as reported by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    /// Not yet included / finalized
    Pending,

    /// Finalized successfully
    Confirmed,

    /// Included and reverted
    Failed,
}

/// One positional field of a raw contract tuple
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawField {
    /// Address-typed field (hex string, opaque to the core)
    Address(String),

    /// String-typed field
    Str(String),

    /// Unsigned integer field (covers uint8 codes through uint256 amounts)
    Uint(u128),

    /// String array field
    StrList(Vec<String>),
}

/// Raw positional tuple returned by the `getListing` call
///
/// Field order: owner, title, location, size, price, priceUnit code, status
/// code, description, features, createdAt, lessee, leaseEndTime. The tuple
/// does not echo the listing id back; callers track it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListing(pub Vec<RawField>);

impl RawListing {
    /// Expected field count of a well-formed tuple
    pub const FIELD_COUNT: usize = 12;
}

/// Fixed call surface of the land-listing contract
///
/// Read calls are view-only and may fail when the provider is unreachable or
/// the call reverts. Write calls submit a signed transaction on behalf of
/// `from` and return the submission hash; finalization is observed separately
/// through [`LandContract::transaction_status`].
#[async_trait]
pub trait LandContract: Send + Sync {
    /// Total number of listings ever created
    async fn get_total_listings(&self) -> Result<u64, ChainError>;

    /// Ids of listings currently open for lease, in contract order
    async fn get_available_listings(&self) -> Result<Vec<ListingId>, ChainError>;

    /// Ids of listings owned by `owner`, in contract order
    async fn get_owner_listings(&self, owner: &str) -> Result<Vec<ListingId>, ChainError>;

    /// Raw tuple for one listing
    async fn get_listing(&self, id: ListingId) -> Result<RawListing, ChainError>;

    /// Submit a listing creation write
    ///
    /// `price_unit_code` is the encoded form of the domain enum.
    #[allow(clippy::too_many_arguments)]
    async fn create_listing(
        &self,
        from: &str,
        title: &str,
        location: &str,
        size: u64,
        price: u128,
        price_unit_code: u8,
        description: &str,
        features: &[String],
    ) -> Result<TxHash, ChainError>;

    /// Submit a lease request write
    ///
    /// Value-bearing: `offered_price` is transferred with the call.
    async fn request_lease(
        &self,
        from: &str,
        id: ListingId,
        duration: u64,
        offered_price: u128,
    ) -> Result<TxHash, ChainError>;

    /// Current finalization status of a submitted transaction
    async fn transaction_status(&self, hash: &str) -> Result<TxStatus, ChainError>;
}
