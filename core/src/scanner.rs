//! # Scan Coordinator
//!
//! Drives one [`HostProbe`] pass over every host address of a [`Subnet`].
//!
//! Probes run as tokio tasks with a semaphore bounding how many are in flight.
//! A permit is taken *before* a task is spawned, so a /16 never materializes
//! 65k tasks at once. The scan returns only after every dispatched probe has
//! finished; per-host failures are absorbed by [`scan_host`] and never abort
//! the pass.
//!
//! Dropping the future returned by [`ScanCoordinator::scan`] aborts every
//! probe still running.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use netsweep_common::config::ResolvePolicy;
use netsweep_common::network::device::{DeviceRecord, ScanResult};
use netsweep_common::network::subnet::Subnet;
use netsweep_common::scanning::HostProbe;
use netsweep_common::vendors::VendorRepository;
use netsweep_common::{debug, error, info, success};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

type ProgressCallback = dyn Fn(usize) + Send + Sync;

pub struct ScanCoordinator {
    probe: Arc<dyn HostProbe>,
    vendors: Arc<dyn VendorRepository>,
    policy: ResolvePolicy,
    on_host_found: Option<Box<ProgressCallback>>,
}

impl ScanCoordinator {
    pub fn new(probe: Arc<dyn HostProbe>, vendors: Arc<dyn VendorRepository>) -> Self {
        Self {
            probe,
            vendors,
            policy: ResolvePolicy::default(),
            on_host_found: None,
        }
    }

    pub fn with_policy(mut self, policy: ResolvePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Registers a callback invoked with the running device count each time a
    /// live host is recorded.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.on_host_found = Some(Box::new(callback));
        self
    }

    /// Probes every host of `subnet` with at most `concurrency_limit` probes
    /// in flight. A limit of zero is treated as one.
    pub async fn scan(&self, subnet: &Subnet, concurrency_limit: usize) -> ScanResult {
        let started = Instant::now();
        let limit = concurrency_limit.max(1);
        let semaphore = Arc::new(Semaphore::new(limit));
        let mut tasks: JoinSet<Option<DeviceRecord>> = JoinSet::new();
        let mut devices: Vec<DeviceRecord> = Vec::new();
        let mut dispatched: usize = 0;

        info!(
            "Scanning {subnet} ({} addresses, up to {limit} probes in flight)",
            subnet.host_count()
        );

        for ip in subnet.hosts() {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            while let Some(done) = tasks.try_join_next() {
                self.collect(done, &mut devices);
            }

            let probe = Arc::clone(&self.probe);
            let vendors = Arc::clone(&self.vendors);
            let policy = self.policy;
            tasks.spawn(async move {
                let _permit = permit;
                scan_host(probe.as_ref(), vendors.as_ref(), ip, policy).await
            });
            dispatched += 1;
        }

        while let Some(done) = tasks.join_next().await {
            self.collect(done, &mut devices);
        }

        let elapsed = started.elapsed();
        info!(
            "Probed {dispatched} addresses in {:.2}s, {} devices found",
            elapsed.as_secs_f64(),
            devices.len()
        );
        ScanResult::new(devices, dispatched, elapsed)
    }

    fn collect(
        &self,
        done: Result<Option<DeviceRecord>, JoinError>,
        devices: &mut Vec<DeviceRecord>,
    ) {
        match done {
            Ok(Some(record)) => {
                devices.push(record);
                if let Some(callback) = &self.on_host_found {
                    callback(devices.len());
                }
            }
            Ok(None) => {}
            Err(e) => error!("A probe task ended abnormally: {e}"),
        }
    }
}

/// Probes a single address.
///
/// Under [`ResolvePolicy::ReachableOnly`] a failed ping ends the probe with no
/// record. Under [`ResolvePolicy::Always`] the MAC is still resolved and a
/// host that answers ARP is reported without latency. MAC and name lookups
/// for a reachable host run concurrently.
pub async fn scan_host(
    probe: &dyn HostProbe,
    vendors: &dyn VendorRepository,
    ip: Ipv4Addr,
    policy: ResolvePolicy,
) -> Option<DeviceRecord> {
    let latency = match probe.ping(ip).await {
        Ok(rtt) => Some(rtt),
        Err(e) => {
            debug!("{ip} did not answer ping: {e}");
            None
        }
    };

    let (mac, name) = match latency {
        Some(_) => tokio::join!(probe.resolve_mac(ip), probe.resolve_name(ip)),
        None if policy == ResolvePolicy::ReachableOnly => return None,
        None => {
            let mac = probe.resolve_mac(ip).await.ok()?;
            (Ok(mac), probe.resolve_name(ip).await)
        }
    };

    let mut record = DeviceRecord::new(ip);
    match mac {
        Ok(mac) => record.mac = mac.to_string(),
        Err(e) => debug!("No MAC for {ip}: {e}"),
    }
    record.vendor = vendors.vendor_for(&record.mac);
    if let Ok(name) = name {
        record.name = name;
    }
    if let Some(rtt) = latency {
        record = record.with_latency(rtt);
    }

    success!("{ip} is up ({}, {})", record.mac, record.vendor);
    Some(record)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
