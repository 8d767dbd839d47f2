#![cfg(test)]
use std::time::Duration;

use netsweep_common::config::VendorConfig;
use netsweep_common::network::device::UNKNOWN;
use netsweep_common::vendors::VendorRepository;
use netsweep_core::VendorDatabase;

use crate::support::{self, VendorServer, ACME_JSON};

const CACHE_FILE: &str = "mac_vendor_list.json";

#[tokio::test]
async fn refresh_downloads_and_caches_the_list() {
    let server = VendorServer::start(200, ACME_JSON, Duration::ZERO).await;
    let dir = support::temp_dir("refresh");
    let db = VendorDatabase::new(support::vendor_config(dir.clone(), &server.url)).unwrap();

    assert!(db.refresh().await);

    assert_eq!(server.hits(), 1);
    assert_eq!(std::fs::read_to_string(dir.join(CACHE_FILE)).unwrap(), ACME_JSON);
    assert_eq!(db.vendor_for("aa:bb:cc:00:00:01"), "Acme");
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn fresh_cache_is_used_without_network_access() {
    let server = VendorServer::start(200, "[]", Duration::ZERO).await;
    let dir = support::temp_dir("fresh");
    std::fs::write(dir.join(CACHE_FILE), ACME_JSON).unwrap();
    let db = VendorDatabase::new(support::vendor_config(dir.clone(), &server.url)).unwrap();

    let table = db.load().await;

    assert_eq!(table.len(), 1);
    assert_eq!(server.hits(), 0);
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn stale_cache_triggers_a_refresh() {
    let server = VendorServer::start(200, ACME_JSON, Duration::ZERO).await;
    let dir = support::temp_dir("stale");
    std::fs::write(dir.join(CACHE_FILE), "[]").unwrap();
    let config = VendorConfig {
        max_age: Duration::ZERO,
        ..support::vendor_config(dir.clone(), &server.url)
    };
    let db = VendorDatabase::new(config).unwrap();

    db.load().await;

    assert_eq!(server.hits(), 1);
    assert_eq!(db.vendor_for("AA:BB:CC:12:34:56"), "Acme");
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn server_error_keeps_previous_table_and_file() {
    let server = VendorServer::start(500, "oops", Duration::ZERO).await;
    let dir = support::temp_dir("http-500");
    std::fs::write(dir.join(CACHE_FILE), ACME_JSON).unwrap();
    let db = VendorDatabase::new(support::vendor_config(dir.clone(), &server.url)).unwrap();
    db.load().await;

    assert!(!db.refresh().await);

    assert_eq!(server.hits(), 1);
    assert_eq!(db.vendor_for("AA:BB:CC:12:34:56"), "Acme");
    assert_eq!(std::fs::read_to_string(dir.join(CACHE_FILE)).unwrap(), ACME_JSON);
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn undecodable_download_is_not_written_to_disk() {
    let server = VendorServer::start(200, "<html>maintenance</html>", Duration::ZERO).await;
    let dir = support::temp_dir("bad-body");
    let db = VendorDatabase::new(support::vendor_config(dir.clone(), &server.url)).unwrap();

    assert!(!db.refresh().await);

    assert!(!dir.join(CACHE_FILE).exists());
    assert!(db.is_empty());
    assert_eq!(db.vendor_for("AA:BB:CC:12:34:56"), UNKNOWN);
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn concurrent_refreshes_share_one_download() {
    let server = VendorServer::start(200, ACME_JSON, Duration::from_millis(200)).await;
    let dir = support::temp_dir("single-flight");
    let db = VendorDatabase::new(support::vendor_config(dir.clone(), &server.url)).unwrap();

    let (first, second) = tokio::join!(db.refresh(), db.refresh());

    assert!(first && second);
    assert_eq!(server.hits(), 1);
    assert_eq!(db.len(), 1);
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn unknown_prefixes_report_unknown() {
    let dir = support::temp_dir("unknown-prefix");
    std::fs::write(dir.join(CACHE_FILE), ACME_JSON).unwrap();
    let db = VendorDatabase::new(support::vendor_config(dir.clone(), support::UNREACHABLE_SOURCE)).unwrap();
    db.load().await;

    assert_eq!(db.get_vendor("00:00:00:11:22:33"), None);
    assert_eq!(db.vendor_for("not a mac"), UNKNOWN);
    assert_eq!(db.vendor_for("aa-bb-cc-01-02-03"), "Acme");
    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn download_is_kept_when_cache_cannot_be_written() {
    let server = VendorServer::start(200, ACME_JSON, Duration::ZERO).await;
    let dir = support::temp_dir("read-only");
    let blocker = dir.join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    let db = VendorDatabase::new(support::vendor_config(blocker.join("data"), &server.url)).unwrap();

    let table = db.load().await;

    assert_eq!(server.hits(), 1);
    assert_eq!(table.len(), 1);
    assert_eq!(db.vendor_for("aa:bb:cc:12:34:56"), "Acme");
    assert!(!blocker.join("data").join(CACHE_FILE).exists());

    db.load().await;
    assert_eq!(db.vendor_for("aa:bb:cc:12:34:56"), "Acme");
    std::fs::remove_dir_all(dir).ok();
}
