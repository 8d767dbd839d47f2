#![cfg(test)]
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use netsweep_common::network::subnet::Subnet;
use netsweep_common::vendors::VendorTable;
use netsweep_core::ScanCoordinator;
use pnet::util::MacAddr;

use crate::support::{MockHost, MockProbe};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_probes_never_exceed_the_limit() {
    let probe = Arc::new(MockProbe::new().with_delay(Duration::from_millis(10)));
    let coordinator = ScanCoordinator::new(probe.clone(), Arc::new(VendorTable::empty()));

    let subnet: Subnet = "192.168.50.0/24".parse().unwrap();
    let result = coordinator.scan(&subnet, 8).await;

    assert!(result.is_empty());
    assert_eq!(result.hosts_probed(), 254);
    assert_eq!(probe.pings.load(Ordering::SeqCst), 254);
    let peak = probe.peak.load(Ordering::SeqCst);
    assert!(peak <= 8, "peak in-flight probes was {peak}");
    assert!(peak > 1, "probes never overlapped");
}

#[tokio::test]
async fn limit_of_one_serializes_probes() {
    let probe = Arc::new(
        MockProbe::new()
            .with_delay(Duration::from_millis(2))
            .with_host(Ipv4Addr::new(10, 2, 0, 3), MockHost::alive(MacAddr(2, 0, 0, 0, 0, 3), 1)),
    );
    let coordinator = ScanCoordinator::new(probe.clone(), Arc::new(VendorTable::empty()));

    let result = coordinator.scan(&"10.2.0.0/28".parse().unwrap(), 1).await;

    assert_eq!(result.len(), 1);
    assert_eq!(probe.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn progress_callback_counts_every_found_host() {
    let mut probe = MockProbe::new();
    for last in 1..=6u8 {
        probe = probe.with_host(Ipv4Addr::new(10, 3, 0, last), MockHost::alive(MacAddr(2, 0, 0, 0, 0, last), 1));
    }
    let reports = Arc::new(std::sync::Mutex::new(Vec::new()));
    let reports_ref = Arc::clone(&reports);
    let coordinator = ScanCoordinator::new(Arc::new(probe), Arc::new(VendorTable::empty()))
        .with_progress(move |count| reports_ref.lock().unwrap().push(count));

    let result = coordinator.scan(&"10.3.0.0/29".parse().unwrap(), 4).await;

    assert_eq!(result.len(), 6);
    assert_eq!(*reports.lock().unwrap(), vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn abandoning_a_scan_stops_outstanding_probes() {
    let probe = Arc::new(MockProbe::new().with_delay(Duration::from_millis(200)));
    let coordinator = ScanCoordinator::new(probe.clone(), Arc::new(VendorTable::empty()));
    let subnet: Subnet = "10.4.0.0/24".parse().unwrap();

    let outcome = tokio::time::timeout(Duration::from_millis(50), coordinator.scan(&subnet, 16)).await;
    assert!(outcome.is_err());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(probe.in_flight.load(Ordering::SeqCst), 0);
    assert!(probe.pings.load(Ordering::SeqCst) <= 16);
}
