//! Shared types for landlease-wallet
//!
//! Domain entities used across the synchronization core.

use serde::{Deserialize, Serialize};

/// Identifier of a listing on the ledger
pub type ListingId = u64;

/// Hash of a submitted transaction, as returned by the provider
pub type TxHash = String;

/// Lifecycle status of a listing as tracked by the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    /// Open for lease requests
    Available,

    /// A lease request is in flight
    Pending,

    /// Currently leased to `current_lessee`
    Leased,

    /// Withdrawn by the owner
    Cancelled,
}

/// Unit the per-period price is quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceUnit {
    Acre,
    Hectare,
}

/// Role a wallet address has chosen on the marketplace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    /// Lists parcels for lease
    Landowner,

    /// Browses and leases parcels
    Seeker,
}

/// One leasable land parcel and its lease state
///
/// Produced fresh on every read; never mutated in place. A re-fetch replaces
/// the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Listing id (supplied by the caller; the ledger call is id-indexed
    /// but does not echo the id back)
    pub id: ListingId,

    /// Owner's wallet address
    pub owner: String,

    pub title: String,

    pub location: String,

    /// Parcel size in the quoted unit
    pub size: u64,

    /// Price per period in the smallest denomination
    pub price: u128,

    pub price_unit: PriceUnit,

    pub status: ListingStatus,

    pub description: String,

    /// Ordered feature tags
    pub features: Vec<String>,

    /// Unix seconds
    pub created_at: u64,

    /// Unix seconds. Equal to `created_at` when the ledger does not track
    /// updates separately (known approximation, see the transform module).
    pub updated_at: u64,

    /// Lessee address, when leased
    pub current_lessee: Option<String>,

    /// Lease expiry in unix seconds, when leased
    pub lease_end_time: Option<u64>,
}

/// Parameters for creating a new listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateListingParams {
    pub title: String,
    pub location: String,
    pub size: u64,
    pub price: u128,
    pub price_unit: PriceUnit,
    pub description: String,
    pub features: Vec<String>,
}

/// Kind of a state-changing call tracked by the submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    CreateListing,
    RequestLease,
}

/// Lifecycle state of a submitted transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    /// Accepted by the provider, not yet finalized on the ledger
    Submitted,

    /// Finalized successfully
    Confirmed,

    /// Rejected by the ledger
    Failed,
}

/// Local tracking record for a submitted write awaiting confirmation
///
/// Transitions exactly once, from `Submitted` to `Confirmed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    /// Unique per submission attempt
    pub hash: TxHash,

    pub kind: TransactionKind,

    pub state: TransactionState,

    /// Target listing for lease requests; `None` for creates, whose id only
    /// exists once the ledger confirms
    pub related_listing_id: Option<ListingId>,

    /// Unix seconds at submission time
    pub submitted_at: u64,
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingStatus::Available => write!(f, "available"),
            ListingStatus::Pending => write!(f, "pending"),
            ListingStatus::Leased => write!(f, "leased"),
            ListingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceUnit::Acre => write!(f, "acre"),
            PriceUnit::Hectare => write!(f, "hectare"),
        }
    }
}

impl std::fmt::Display for ProfileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileType::Landowner => write!(f, "landowner"),
            ProfileType::Seeker => write!(f, "seeker"),
        }
    }
}

impl std::str::FromStr for ProfileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "landowner" => Ok(ProfileType::Landowner),
            "seeker" => Ok(ProfileType::Seeker),
            _ => Err(format!(
                "Invalid profile type '{}'. Valid options: landowner, seeker",
                s
            )),
        }
    }
}
