//! Shared test doubles for the contract and connector boundaries

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use landlease_wallet::chain::{ChainError, LandContract, RawField, RawListing, TxStatus};
use landlease_wallet::session::{ConnectionError, WalletConnector};
use landlease_wallet::types::{ListingId, TxHash};

/// Initialize logger for tests
///
/// Captures log output from the crate under RUST_LOG control. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Well-formed raw tuple for tests
pub fn raw_listing(owner: &str, title: &str) -> RawListing {
    RawListing(vec![
        RawField::Address(owner.to_string()),
        RawField::Str(title.to_string()),
        RawField::Str("Nakuru".to_string()),
        RawField::Uint(25),
        RawField::Uint(1_000_000_000_000_000_000),
        RawField::Uint(0),
        RawField::Uint(0),
        RawField::Str("Test parcel".to_string()),
        RawField::StrList(vec!["water".to_string()]),
        RawField::Uint(1_700_000_000),
        RawField::Address("0x0000000000000000000000000000000000000000".to_string()),
        RawField::Uint(0),
    ])
}

/// In-memory scriptable contract double
///
/// Tracks call counts and an in-flight gauge so tests can assert the
/// aggregator's concurrency bound and the cache's deduplication.
pub struct MockLedger {
    listings: Mutex<HashMap<ListingId, RawListing>>,
    available: Mutex<Vec<ListingId>>,
    owners: Mutex<HashMap<String, Vec<ListingId>>>,

    /// Ids whose reads fail with a revert
    failing_ids: Mutex<HashSet<ListingId>>,

    /// Artificial latency applied to read calls
    read_delay: Mutex<Option<Duration>>,

    /// Error returned by the next write submissions, when set
    write_error: Mutex<Option<ChainError>>,

    /// Scripted status sequences per hash; the last entry repeats.
    /// Unscripted hashes confirm immediately.
    tx_statuses: Mutex<HashMap<TxHash, Vec<TxStatus>>>,

    total_calls: AtomicUsize,
    available_calls: AtomicUsize,
    owner_calls: AtomicUsize,
    listing_calls: AtomicUsize,
    write_calls: AtomicUsize,

    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,

    next_hash: AtomicUsize,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            listings: Mutex::new(HashMap::new()),
            available: Mutex::new(Vec::new()),
            owners: Mutex::new(HashMap::new()),
            failing_ids: Mutex::new(HashSet::new()),
            read_delay: Mutex::new(None),
            write_error: Mutex::new(None),
            tx_statuses: Mutex::new(HashMap::new()),
            total_calls: AtomicUsize::new(0),
            available_calls: AtomicUsize::new(0),
            owner_calls: AtomicUsize::new(0),
            listing_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            next_hash: AtomicUsize::new(1),
        }
    }

    pub fn insert_listing(&self, id: ListingId, raw: RawListing) {
        self.listings.lock().unwrap().insert(id, raw);
    }

    pub fn set_available(&self, ids: Vec<ListingId>) {
        *self.available.lock().unwrap() = ids;
    }

    pub fn set_owner_listings(&self, owner: &str, ids: Vec<ListingId>) {
        self.owners.lock().unwrap().insert(owner.to_string(), ids);
    }

    pub fn fail_listing(&self, id: ListingId) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    pub fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_write_error(&self, error: ChainError) {
        *self.write_error.lock().unwrap() = Some(error);
    }

    /// Script the status sequence polled for `hash`; the last entry repeats
    pub fn script_status(&self, hash: &str, statuses: Vec<TxStatus>) {
        self.tx_statuses
            .lock()
            .unwrap()
            .insert(hash.to_string(), statuses);
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn available_calls(&self) -> usize {
        self.available_calls.load(Ordering::SeqCst)
    }

    pub fn owner_calls(&self) -> usize {
        self.owner_calls.load(Ordering::SeqCst)
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously in-flight read calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Number of read calls in flight right now
    pub fn current_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn read_pause(&self) {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        // Decrement via a guard so an aborted read still drains the gauge
        let _guard = InFlightGuard(&self.in_flight);

        let delay = *self.read_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn take_write_error(&self) -> Option<ChainError> {
        self.write_error.lock().unwrap().take()
    }

    fn mint_hash(&self) -> TxHash {
        format!("0xtx{:04}", self.next_hash.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl LandContract for MockLedger {
    async fn get_total_listings(&self) -> Result<u64, ChainError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        self.read_pause().await;
        Ok(self.listings.lock().unwrap().len() as u64)
    }

    async fn get_available_listings(&self) -> Result<Vec<ListingId>, ChainError> {
        self.available_calls.fetch_add(1, Ordering::SeqCst);
        self.read_pause().await;
        Ok(self.available.lock().unwrap().clone())
    }

    async fn get_owner_listings(&self, owner: &str) -> Result<Vec<ListingId>, ChainError> {
        self.owner_calls.fetch_add(1, Ordering::SeqCst);
        self.read_pause().await;
        Ok(self
            .owners
            .lock()
            .unwrap()
            .get(owner)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_listing(&self, id: ListingId) -> Result<RawListing, ChainError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.read_pause().await;

        if self.failing_ids.lock().unwrap().contains(&id) {
            return Err(ChainError::Reverted(format!("listing {} unavailable", id)));
        }

        self.listings
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ChainError::Reverted(format!("no listing {}", id)))
    }

    async fn create_listing(
        &self,
        _from: &str,
        _title: &str,
        _location: &str,
        _size: u64,
        _price: u128,
        _price_unit_code: u8,
        _description: &str,
        _features: &[String],
    ) -> Result<TxHash, ChainError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.take_write_error() {
            return Err(error);
        }
        Ok(self.mint_hash())
    }

    async fn request_lease(
        &self,
        _from: &str,
        _id: ListingId,
        _duration: u64,
        _offered_price: u128,
    ) -> Result<TxHash, ChainError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.take_write_error() {
            return Err(error);
        }
        Ok(self.mint_hash())
    }

    async fn transaction_status(&self, hash: &str) -> Result<TxStatus, ChainError> {
        let mut statuses = self.tx_statuses.lock().unwrap();
        match statuses.get_mut(hash) {
            Some(sequence) if sequence.len() > 1 => Ok(sequence.remove(0)),
            Some(sequence) => Ok(sequence[0]),
            None => Ok(TxStatus::Confirmed),
        }
    }
}

/// Scriptable connector double
pub struct MockConnector {
    outcome: Mutex<Result<String, ConnectionError>>,

    /// Artificial handshake latency, for racing other session operations
    /// against an in-flight handshake
    delay: Mutex<Option<Duration>>,

    connect_calls: AtomicUsize,
}

impl MockConnector {
    /// Connector that hands out `address` on every handshake
    pub fn new(address: &str) -> Self {
        Self {
            outcome: Mutex::new(Ok(address.to_string())),
            delay: Mutex::new(None),
            connect_calls: AtomicUsize::new(0),
        }
    }

    /// Connector whose handshake the user rejects
    pub fn rejecting(reason: &str) -> Self {
        Self {
            outcome: Mutex::new(Err(ConnectionError::Rejected(reason.to_string()))),
            delay: Mutex::new(None),
            connect_calls: AtomicUsize::new(0),
        }
    }

    /// Connector whose handshake takes `delay` before handing out `address`
    pub fn with_delay(address: &str, delay: Duration) -> Self {
        let connector = Self::new(address);
        *connector.delay.lock().unwrap() = Some(delay);
        connector
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletConnector for MockConnector {
    async fn connect(&self) -> Result<String, ConnectionError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.outcome.lock().unwrap().clone()
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
