//! The production [`HostProbe`]: real ICMP, ARP and name lookups.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use netsweep_common::config::ScanConfig;
use netsweep_common::error::ProbeError;
use netsweep_common::scanning::HostProbe;
use netsweep_common::{debug, warn};
use pnet::util::MacAddr;
use tokio::sync::OnceCell;

use crate::network::{arp, icmp, names};

pub struct NetworkProbe {
    config: ScanConfig,
    icmp: OnceCell<surge_ping::Client>,
    privilege_warned: AtomicBool,
}

impl NetworkProbe {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            icmp: OnceCell::new(),
            privilege_warned: AtomicBool::new(false),
        }
    }

    /// Whether a missing-privilege warning has been logged during this probe's lifetime.
    pub fn privilege_warning_issued(&self) -> bool {
        self.privilege_warned.load(Ordering::Acquire)
    }

    fn note_failure(&self, operation: &str, ip: Ipv4Addr, err: &ProbeError) {
        if !err.is_permission_denied() {
            debug!("{operation} for {ip} failed: {err}");
            return;
        }
        if self.privilege_warned.swap(true, Ordering::AcqRel) {
            debug!("{operation} for {ip} denied: {err}");
        } else {
            warn!(
                "{operation} needs elevated privileges (root or CAP_NET_RAW): {err}. \
                 Affected fields will be reported as Unknown"
            );
        }
    }

    async fn icmp_client(&self) -> Result<&surge_ping::Client, ProbeError> {
        self.icmp.get_or_try_init(|| async { icmp::client() }).await
    }
}

#[async_trait]
impl HostProbe for NetworkProbe {
    async fn ping(&self, ip: Ipv4Addr) -> Result<Duration, ProbeError> {
        let result = match self.icmp_client().await {
            Ok(client) => icmp::echo(client, ip, self.config.ping_timeout).await,
            Err(e) => Err(e),
        };
        result.inspect_err(|e| self.note_failure("ICMP echo", ip, e))
    }

    async fn resolve_mac(&self, ip: Ipv4Addr) -> Result<MacAddr, ProbeError> {
        if self.config.use_neighbor_cache {
            if let Some(mac) = arp::lookup_neighbor(ip).await {
                return Ok(mac);
            }
        }
        arp::request(ip, self.config.arp_timeout)
            .await
            .inspect_err(|e| self.note_failure("ARP request", ip, e))
    }

    async fn resolve_name(&self, ip: Ipv4Addr) -> Result<String, ProbeError> {
        if self.config.no_names {
            return Err(ProbeError::Unavailable("name resolution disabled".to_string()));
        }
        names::resolve(ip, self.config.name_timeout)
            .await
            .inspect_err(|e| debug!("Name lookup for {ip} failed: {e}"))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
