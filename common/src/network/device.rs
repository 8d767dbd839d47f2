//! # Device Records
//!
//! The per-host record produced by a probe and the collection returned by one
//! scan pass.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Sentinel for any field whose resolution failed or was not attempted.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub ip: Ipv4Addr,
    pub mac: String,
    pub vendor: String,
    pub name: String,
    /// Round-trip time of the liveness probe; absent when the host did not answer ICMP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl DeviceRecord {
    /// A record with every resolvable field set to [`UNKNOWN`].
    pub fn new(ip: Ipv4Addr) -> Self {
        Self {
            ip,
            mac: UNKNOWN.to_string(),
            vendor: UNKNOWN.to_string(),
            name: UNKNOWN.to_string(),
            latency_ms: None,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_ms = Some(latency_to_ms(latency));
        self
    }

    pub fn is_reachable(&self) -> bool {
        self.latency_ms.is_some()
    }

    /// Everything but latency, for comparing two scans of the same network.
    pub fn identity(&self) -> (Ipv4Addr, String, String, String) {
        (self.ip, self.mac.clone(), self.vendor.clone(), self.name.clone())
    }
}

/// Rounds a round-trip time to the nearest whole millisecond.
pub fn latency_to_ms(latency: Duration) -> u64 {
    (latency.as_secs_f64() * 1000.0).round() as u64
}

/// Live hosts found during one scan pass, in completion order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    devices: Vec<DeviceRecord>,
    hosts_probed: usize,
    #[serde(serialize_with = "serialize_elapsed")]
    elapsed: Duration,
}

impl ScanResult {
    pub fn new(devices: Vec<DeviceRecord>, hosts_probed: usize, elapsed: Duration) -> Self {
        Self {
            devices,
            hosts_probed,
            elapsed,
        }
    }

    pub fn devices(&self) -> &[DeviceRecord] {
        &self.devices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceRecord> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Number of addresses that were dispatched to a probe.
    pub fn hosts_probed(&self) -> usize {
        self.hosts_probed
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn find(&self, ip: Ipv4Addr) -> Option<&DeviceRecord> {
        self.devices.iter().find(|device| device.ip == ip)
    }

    pub fn sort_by_ip(&mut self) {
        self.devices.sort_by_key(|device| device.ip);
    }

    /// The set of device identities, ignoring latency jitter.
    pub fn identities(&self) -> BTreeSet<(Ipv4Addr, String, String, String)> {
        self.devices.iter().map(DeviceRecord::identity).collect()
    }
}

impl<'a> IntoIterator for &'a ScanResult {
    type Item = &'a DeviceRecord;
    type IntoIter = std::slice::Iter<'a, DeviceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}

fn serialize_elapsed<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u128(elapsed.as_millis())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
