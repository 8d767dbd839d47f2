#![cfg(test)]
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use netsweep_common::config::{ResolvePolicy, ScanConfig};
use netsweep_common::error::SubnetError;
use netsweep_common::network::device::UNKNOWN;
use netsweep_common::network::subnet::Subnet;
use netsweep_common::vendors::{VendorEntry, VendorTable};
use netsweep_core::{NetworkProbe, ScanCoordinator, VendorDatabase};
use pnet::util::MacAddr;

use crate::support::{self, MockHost, MockProbe};

const ACME_MAC: MacAddr = MacAddr(0xaa, 0xbb, 0xcc, 0x11, 0x22, 0x33);

fn acme_vendors() -> Arc<VendorTable> {
    Arc::new(VendorTable::from_entries(vec![VendorEntry::new("AA:BB:CC", "Acme")]))
}

/// Two usable hosts: one alive, one silent. Vendors come from an on-disk cache.
#[tokio::test]
async fn discovery_slash_30_finds_the_single_live_host() {
    let dir = support::temp_dir("e2e");
    std::fs::write(dir.join("mac_vendor_list.json"), support::ACME_JSON).unwrap();
    let db = VendorDatabase::new(support::vendor_config(dir.clone(), support::UNREACHABLE_SOURCE)).unwrap();
    db.load().await;

    let probe = MockProbe::new().with_host(Ipv4Addr::new(10, 0, 0, 1), MockHost::alive(ACME_MAC, 5));
    let coordinator = ScanCoordinator::new(Arc::new(probe), Arc::new(db));

    let subnet: Subnet = "10.0.0.0/30".parse().unwrap();
    let result = coordinator.scan(&subnet, 8).await;

    assert_eq!(result.len(), 1);
    assert_eq!(result.hosts_probed(), 2);
    let record = &result.devices()[0];
    assert_eq!(record.ip, Ipv4Addr::new(10, 0, 0, 1));
    assert!(record.mac.eq_ignore_ascii_case("AA:BB:CC:11:22:33"));
    assert_eq!(record.latency_ms, Some(5));
    assert_eq!(record.vendor, "Acme");
    assert_eq!(record.name, UNKNOWN);
    assert!(result.find(Ipv4Addr::new(10, 0, 0, 2)).is_none());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn discovery_with_empty_vendor_database_reports_unknown_vendors() {
    let dir = support::temp_dir("no-vendors");
    let db = VendorDatabase::new(support::vendor_config(dir.clone(), support::UNREACHABLE_SOURCE)).unwrap();
    assert!(db.load().await.is_empty());

    let probe = MockProbe::new()
        .with_host(Ipv4Addr::new(192, 168, 7, 1), MockHost::alive(ACME_MAC, 1))
        .with_host(
            Ipv4Addr::new(192, 168, 7, 20),
            MockHost::alive(MacAddr(0x00, 0x1b, 0x63, 1, 2, 3), 2).named("laptop"),
        );
    let coordinator = ScanCoordinator::new(Arc::new(probe), Arc::new(db));

    let subnet: Subnet = "192.168.7.0/27".parse().unwrap();
    let result = coordinator.scan(&subnet, 4).await;

    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|record| record.vendor == UNKNOWN));
    assert!(result.iter().all(|record| record.mac != UNKNOWN));
    assert_eq!(result.find(Ipv4Addr::new(192, 168, 7, 20)).unwrap().name, "laptop");

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn hosts_failing_ping_produce_no_record() {
    let probe = Arc::new(
        MockProbe::new()
            .with_host(Ipv4Addr::new(10, 1, 0, 5), MockHost::firewalled(ACME_MAC))
            .with_host(Ipv4Addr::new(10, 1, 0, 6), MockHost::firewalled(ACME_MAC)),
    );
    let coordinator = ScanCoordinator::new(probe.clone(), acme_vendors());

    let subnet: Subnet = "10.1.0.0/28".parse().unwrap();
    let result = coordinator.scan(&subnet, 16).await;

    assert!(result.is_empty());
    assert_eq!(probe.pings.load(Ordering::SeqCst), 14);
    assert_eq!(probe.resolutions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn always_policy_reports_firewalled_hosts_without_latency() {
    let probe = MockProbe::new()
        .with_host(Ipv4Addr::new(10, 1, 0, 1), MockHost::alive(ACME_MAC, 3))
        .with_host(Ipv4Addr::new(10, 1, 0, 5), MockHost::firewalled(ACME_MAC));
    let coordinator =
        ScanCoordinator::new(Arc::new(probe), acme_vendors()).with_policy(ResolvePolicy::Always);

    let subnet: Subnet = "10.1.0.0/28".parse().unwrap();
    let mut result = coordinator.scan(&subnet, 16).await;
    result.sort_by_ip();

    assert_eq!(result.len(), 2);
    assert_eq!(result.devices()[0].latency_ms, Some(3));
    assert_eq!(result.devices()[1].ip, Ipv4Addr::new(10, 1, 0, 5));
    assert_eq!(result.devices()[1].latency_ms, None);
    assert_eq!(result.devices()[1].vendor, "Acme");
}

#[tokio::test]
async fn every_record_belongs_to_the_scanned_subnet() {
    let mut probe = MockProbe::new();
    for last in [1u8, 17, 42, 200, 254] {
        probe = probe.with_host(Ipv4Addr::new(172, 16, 3, last), MockHost::alive(ACME_MAC, 1));
    }
    // Outside the scanned range; must never show up.
    probe = probe.with_host(Ipv4Addr::new(172, 16, 4, 1), MockHost::alive(ACME_MAC, 1));
    let coordinator = ScanCoordinator::new(Arc::new(probe), acme_vendors());

    let subnet: Subnet = "172.16.3.99/24".parse().unwrap();
    let result = coordinator.scan(&subnet, 32).await;

    assert_eq!(result.len(), 5);
    let hosts: Vec<Ipv4Addr> = subnet.hosts().collect();
    assert!(result.iter().all(|record| subnet.contains(record.ip) && hosts.contains(&record.ip)));
}

#[tokio::test]
async fn repeated_scans_agree_up_to_latency() {
    let probe = MockProbe::new()
        .with_jitter()
        .with_host(Ipv4Addr::new(10, 9, 0, 1), MockHost::alive(ACME_MAC, 4).named("router"))
        .with_host(Ipv4Addr::new(10, 9, 0, 3), MockHost::alive(MacAddr(2, 0, 0, 0, 0, 3), 9));
    let coordinator = ScanCoordinator::new(Arc::new(probe), acme_vendors());
    let subnet: Subnet = "10.9.0.0/29".parse().unwrap();

    let first = coordinator.scan(&subnet, 3).await;
    let second = coordinator.scan(&subnet, 3).await;

    assert_eq!(first.len(), 2);
    assert_eq!(first.identities(), second.identities());
}

#[tokio::test]
async fn json_output_uses_camel_case_and_omits_missing_latency() {
    let probe = MockProbe::new()
        .with_host(Ipv4Addr::new(10, 1, 0, 1), MockHost::alive(ACME_MAC, 7))
        .with_host(Ipv4Addr::new(10, 1, 0, 2), MockHost::firewalled(ACME_MAC));
    let coordinator =
        ScanCoordinator::new(Arc::new(probe), acme_vendors()).with_policy(ResolvePolicy::Always);

    let mut result = coordinator.scan(&"10.1.0.0/30".parse().unwrap(), 2).await;
    result.sort_by_ip();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["hostsProbed"], 2);
    assert_eq!(json["devices"][0]["latencyMs"], 7);
    assert_eq!(json["devices"][0]["vendor"], "Acme");
    assert!(json["devices"][1].get("latencyMs").is_none());
}

#[test]
fn malformed_subnets_are_rejected_before_probing() {
    assert!(matches!(
        "10.0.0.0/33".parse::<Subnet>(),
        Err(SubnetError::PrefixOutOfRange { prefix: 33, .. })
    ));
    assert!(matches!("fe80::/64".parse::<Subnet>(), Err(SubnetError::Ipv6Unsupported { .. })));
    assert!(matches!("not-a-subnet".parse::<Subnet>(), Err(SubnetError::Malformed { .. })));
}

/// Exercises the real probe against the loopback interface.
#[tokio::test]
#[ignore = "needs ICMP socket permission"]
async fn discovery_single_loopback() {
    let config = ScanConfig {
        no_names: true,
        ..ScanConfig::default()
    };
    let coordinator = ScanCoordinator::new(Arc::new(NetworkProbe::new(config)), acme_vendors());

    let subnet: Subnet = "127.0.0.1/32".parse().unwrap();
    let result = coordinator.scan(&subnet, 1).await;

    assert_eq!(result.len(), 1, "No hosts found when scanning localhost");
    let record = &result.devices()[0];
    assert_eq!(record.ip, Ipv4Addr::LOCALHOST);
    assert!(record.is_reachable());
    assert_eq!(record.mac, UNKNOWN);
}

#[tokio::test]
async fn a_crashing_probe_task_does_not_abort_the_scan() {
    let probe = Arc::new(
        MockProbe::new()
            .with_host(Ipv4Addr::new(10, 5, 0, 1), MockHost::alive(ACME_MAC, 2))
            .with_host(Ipv4Addr::new(10, 5, 0, 2), MockHost::alive(MacAddr(2, 0, 0, 0, 0, 2), 2))
            .with_host(Ipv4Addr::new(10, 5, 0, 6), MockHost::alive(MacAddr(2, 0, 0, 0, 0, 6), 2))
            .with_crash_on(Ipv4Addr::new(10, 5, 0, 2)),
    );
    let coordinator = ScanCoordinator::new(probe.clone(), acme_vendors());

    let mut result = coordinator.scan(&"10.5.0.0/29".parse().unwrap(), 2).await;
    result.sort_by_ip();

    assert_eq!(result.hosts_probed(), 6);
    assert_eq!(probe.pings.load(Ordering::SeqCst), 6);
    assert_eq!(probe.in_flight.load(Ordering::SeqCst), 0);
    let found: Vec<Ipv4Addr> = result.iter().map(|record| record.ip).collect();
    assert_eq!(found, vec![Ipv4Addr::new(10, 5, 0, 1), Ipv4Addr::new(10, 5, 0, 6)]);
}
