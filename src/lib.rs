//! LandLease wallet-session and listing synchronization core
//!
//! Reconciles three consistency domains for a land-lease marketplace front
//! end: volatile in-memory session state, a durable local profile store, and
//! an external, eventually-confirmed ledger holding the listings. UI layers
//! plug a concrete [`chain::LandContract`] transport and
//! [`session::WalletConnector`] into [`manager::MarketplaceManager`].

pub mod cache;
pub mod chain;
pub mod codec;
pub mod config;
pub mod manager;
pub mod session;
pub mod storage;
pub mod types;

pub use cache::{QueryCache, QueryKey, QueryValue};
pub use chain::{
    ChainError, FetchReport, LandContract, ListingAggregator, ListingReadGateway, RawField,
    RawListing, ReadError, TransactionSubmitter, TxStatus, WriteError,
};
pub use codec::DecodeError;
pub use config::{ConfigOverrides, GlobalConfig};
pub use manager::{ManagerError, MarketplaceManager};
pub use session::{
    ConnectionError, ConnectionState, SessionError, WalletConnector, WalletSession,
    WalletSessionManager,
};
pub use storage::{PersistedProfile, ProfileStore, StorageError};
pub use types::{
    CreateListingParams, Listing, ListingId, ListingStatus, PendingTransaction, PriceUnit,
    ProfileType, TransactionKind, TransactionState, TxHash,
};
