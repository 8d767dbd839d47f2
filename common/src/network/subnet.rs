//! # Subnet Model
//!
//! An IPv4 network in CIDR form, parsed non-strictly (host bits in the base
//! address are masked away) and enumerable as an ordered sequence of host
//! addresses.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::SubnetError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    network: Ipv4Network,
}

impl Subnet {
    /// Builds the subnet containing `addr` with the given prefix length.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, SubnetError> {
        let raw = Ipv4Network::new(addr, prefix).map_err(|_| SubnetError::PrefixOutOfRange {
            input: format!("{addr}/{prefix}"),
            prefix: prefix.into(),
        })?;
        let network = Ipv4Network::new(raw.network(), prefix).map_err(|e| {
            SubnetError::Malformed {
                input: format!("{addr}/{prefix}"),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { network })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network.network()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.network.broadcast()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.network.contains(ip)
    }

    /// Number of addresses [`Subnet::hosts`] yields.
    pub fn host_count(&self) -> u64 {
        let (start, end) = self.host_bounds();
        u64::from(end) - u64::from(start) + 1
    }

    /// Enumerates usable host addresses in ascending order.
    ///
    /// Network and broadcast addresses are excluded, except for `/31`
    /// (both addresses are hosts) and `/32` (the single address).
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + Send + 'static {
        let (start, end) = self.host_bounds();
        (start..=end).map(Ipv4Addr::from)
    }

    fn host_bounds(&self) -> (u32, u32) {
        let network: u32 = self.network().into();
        let broadcast: u32 = self.broadcast().into();
        match self.prefix() {
            31 | 32 => (network, broadcast),
            _ => (network.saturating_add(1), broadcast.saturating_sub(1)),
        }
    }
}

impl From<Ipv4Network> for Subnet {
    fn from(net: Ipv4Network) -> Self {
        // Prefix came from a valid network, so re-masking cannot fail.
        let network = Ipv4Network::new(net.network(), net.prefix()).unwrap_or(net);
        Self { network }
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix())
    }
}

impl FromStr for Subnet {
    type Err = SubnetError;

    /// Parses `"a.b.c.d/p"`, or a bare `"a.b.c.d"` as a `/32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let malformed = |reason: String| SubnetError::Malformed {
            input: input.to_string(),
            reason,
        };

        if input.is_empty() {
            return Err(malformed("empty input".to_string()));
        }

        let (addr_str, prefix_str) = match input.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix)),
            None => (input, None),
        };

        let addr = match addr_str.parse::<IpAddr>() {
            Ok(IpAddr::V4(v4)) => v4,
            Ok(IpAddr::V6(_)) => {
                return Err(SubnetError::Ipv6Unsupported {
                    input: input.to_string(),
                });
            }
            Err(e) => return Err(malformed(format!("'{addr_str}' is not an address: {e}"))),
        };

        let prefix: u32 = match prefix_str {
            None => 32,
            Some(p) => p
                .parse::<u32>()
                .map_err(|e| malformed(format!("'{p}' is not a prefix length: {e}")))?,
        };

        if prefix > 32 {
            return Err(SubnetError::PrefixOutOfRange {
                input: input.to_string(),
                prefix,
            });
        }

        Subnet::new(addr, prefix as u8).map_err(|e| match e {
            SubnetError::Malformed { reason, .. } => malformed(reason),
            other => other,
        })
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
