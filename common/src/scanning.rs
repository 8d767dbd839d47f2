//! The probing **abstraction** the scan coordinator drives.
//!
//! Each operation targets a single address, is bounded by its own timeout and
//! reports failure as a [`ProbeError`]. Callers decide how failures are
//! absorbed; implementations never retry.

use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use pnet::util::MacAddr;

use crate::error::ProbeError;

#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Sends one ICMP echo and returns the round-trip time.
    async fn ping(&self, ip: Ipv4Addr) -> Result<Duration, ProbeError>;

    /// Resolves the link-layer address answering for `ip`.
    async fn resolve_mac(&self, ip: Ipv4Addr) -> Result<MacAddr, ProbeError>;

    /// Resolves a human-readable name for `ip`.
    async fn resolve_name(&self, ip: Ipv4Addr) -> Result<String, ProbeError>;
}
