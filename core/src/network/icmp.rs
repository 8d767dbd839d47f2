//! ICMP echo via `surge-ping`.
//!
//! One [`Client`] owns the ICMP socket and demultiplexes replies by
//! identifier, so every probe in a scan can share it.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use netsweep_common::error::ProbeError;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError};

const PAYLOAD: [u8; 56] = [0u8; 56];

/// Opens the shared ICMP socket. Fails with `PermissionDenied` when the process
/// may not open ICMP sockets.
pub fn client() -> Result<Client, ProbeError> {
    Client::new(&Config::default()).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => {
            ProbeError::PermissionDenied(format!("opening an ICMP socket: {e}"))
        }
        _ => ProbeError::from(e),
    })
}

/// Sends a single echo request and returns the round-trip time.
pub async fn echo(client: &Client, ip: Ipv4Addr, timeout: Duration) -> Result<Duration, ProbeError> {
    let mut pinger = client
        .pinger(IpAddr::V4(ip), PingIdentifier(rand::random()))
        .await;
    pinger.timeout(timeout);

    match pinger.ping(PingSequence(0), &PAYLOAD).await {
        Ok((_packet, rtt)) => Ok(rtt),
        Err(SurgeError::Timeout { .. }) => Err(ProbeError::Timeout),
        Err(SurgeError::IOError(e)) => Err(ProbeError::from(e)),
        Err(e) => Err(ProbeError::Unavailable(e.to_string())),
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
