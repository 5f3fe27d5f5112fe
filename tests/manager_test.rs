//! Tests for cache-mediated reads through the marketplace manager

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{raw_listing, MockConnector, MockLedger};
use landlease_wallet::cache::QueryKey;
use landlease_wallet::config::GlobalConfig;
use landlease_wallet::manager::MarketplaceManager;
use landlease_wallet::storage::ProfileStore;

const ADDRESS: &str = "0xdddd000000000000000000000000000000000004";

fn test_config() -> GlobalConfig {
    let mut config = GlobalConfig::default_testnet();
    config.confirmation.poll_interval_ms = 10;
    config.confirmation.timeout_ms = 500;
    config.read_concurrency = 4;
    config
}

fn manager_over(ledger: Arc<MockLedger>) -> MarketplaceManager {
    MarketplaceManager::with_profile_store(
        test_config(),
        ledger,
        Arc::new(MockConnector::new(ADDRESS)),
        ProfileStore::open_in_memory().unwrap(),
    )
}

#[tokio::test]
async fn repeated_reads_hit_the_cache() {
    let ledger = Arc::new(MockLedger::new());
    ledger.insert_listing(1, raw_listing(ADDRESS, "one"));

    let manager = manager_over(Arc::clone(&ledger));

    assert_eq!(manager.total_listings().await.unwrap(), 1);
    assert_eq!(manager.total_listings().await.unwrap(), 1);
    assert_eq!(
        ledger.total_calls(),
        1,
        "second read must be served from the cache"
    );
}

#[tokio::test]
async fn concurrent_misses_coalesce_into_one_external_read() {
    let ledger = Arc::new(MockLedger::new());
    ledger.set_available(vec![1, 2]);
    ledger.set_read_delay(Duration::from_millis(30));

    let manager = manager_over(Arc::clone(&ledger));

    let (first, second) = tokio::join!(
        manager.available_listing_ids(),
        manager.available_listing_ids()
    );

    assert_eq!(first.unwrap(), vec![1, 2]);
    assert_eq!(second.unwrap(), vec![1, 2]);
    assert_eq!(
        ledger.available_calls(),
        1,
        "concurrent cache misses must share one underlying read"
    );
}

#[tokio::test]
async fn owner_listings_are_cached_per_address() {
    let ledger = Arc::new(MockLedger::new());
    ledger.set_owner_listings(ADDRESS, vec![7]);
    ledger.set_owner_listings("0xother", vec![8]);

    let manager = manager_over(Arc::clone(&ledger));

    assert_eq!(manager.owner_listing_ids(ADDRESS).await.unwrap(), vec![7]);
    assert_eq!(manager.owner_listing_ids("0xother").await.unwrap(), vec![8]);
    assert_eq!(manager.owner_listing_ids(ADDRESS).await.unwrap(), vec![7]);
    assert_eq!(ledger.owner_calls(), 2, "one external read per address");
}

#[tokio::test]
async fn failed_reads_are_not_cached() {
    let ledger = Arc::new(MockLedger::new());
    ledger.fail_listing(9);

    let manager = manager_over(Arc::clone(&ledger));

    assert!(manager.listing(9).await.is_err());
    assert!(
        !manager.cache().contains(&QueryKey::Listing(9)),
        "failures must not poison the cache"
    );

    // The next call goes back to the ledger
    assert!(manager.listing(9).await.is_err());
    assert_eq!(ledger.listing_calls(), 2);
}

#[tokio::test]
async fn browse_available_fetches_each_available_listing() {
    let ledger = Arc::new(MockLedger::new());
    ledger.insert_listing(1, raw_listing(ADDRESS, "one"));
    ledger.insert_listing(2, raw_listing(ADDRESS, "two"));
    ledger.insert_listing(3, raw_listing(ADDRESS, "three"));
    ledger.set_available(vec![3, 1]);

    let manager = manager_over(Arc::clone(&ledger));
    let report = manager.browse_available().await.unwrap();

    let ids: Vec<_> = report.listings.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![3, 1], "contract order of available ids is kept");
    assert!(report.is_complete());
}

#[tokio::test]
async fn my_listings_requires_a_connected_wallet() {
    let ledger = Arc::new(MockLedger::new());
    let manager = manager_over(Arc::clone(&ledger));

    assert!(manager.my_listings().await.is_err());
    assert_eq!(ledger.owner_calls(), 0, "no external call without a session");

    ledger.insert_listing(4, raw_listing(ADDRESS, "mine"));
    ledger.set_owner_listings(ADDRESS, vec![4]);

    manager.connect().await.unwrap();
    let report = manager.my_listings().await.unwrap();
    assert_eq!(report.listings.len(), 1);
    assert_eq!(report.listings[0].owner, ADDRESS);
}
