//! Wire formats spoken by the probes: ARP over raw Ethernet and the NetBIOS
//! name service node status query.

pub mod arp;
pub mod netbios;

pub use arp::PacketError;
