//! Host name resolution: reverse DNS through the system resolver, then a
//! NetBIOS node status query for hosts DNS knows nothing about.

use std::net::{IpAddr, Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use dns_lookup::lookup_addr;
use netsweep_common::debug;
use netsweep_common::error::ProbeError;
use netsweep_protocols::netbios::{self, NETBIOS_NS_PORT};
use tokio::net::UdpSocket;
use tokio::time::Instant;

const RECV_BUFFER: usize = 1024;

/// Tries reverse DNS, then NetBIOS, within a single `budget`.
pub async fn resolve(ip: Ipv4Addr, budget: Duration) -> Result<String, ProbeError> {
    let deadline = Instant::now() + budget;
    match reverse_dns(ip, budget).await {
        Ok(name) => return Ok(name),
        Err(e) => debug!("Reverse DNS for {ip} failed: {e}"),
    }
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(ProbeError::Timeout);
    }
    netbios_name(ip, remaining).await
}

/// Reverse lookup through the system resolver. A result that merely echoes
/// the address back counts as no answer.
pub async fn reverse_dns(ip: Ipv4Addr, timeout: Duration) -> Result<String, ProbeError> {
    let lookup = tokio::task::spawn_blocking(move || lookup_addr(&IpAddr::V4(ip)));

    match tokio::time::timeout(timeout, lookup).await {
        Ok(Ok(Ok(host))) if is_real_name(&host, ip) => Ok(host),
        Ok(Ok(Ok(_))) => Err(ProbeError::NoReply),
        Ok(Ok(Err(e))) => Err(ProbeError::Unavailable(e.to_string())),
        Ok(Err(join_err)) => Err(ProbeError::Unavailable(join_err.to_string())),
        Err(_) => Err(ProbeError::Timeout),
    }
}

pub async fn netbios_name(ip: Ipv4Addr, timeout: Duration) -> Result<String, ProbeError> {
    query_node_status(SocketAddrV4::new(ip, NETBIOS_NS_PORT), timeout).await
}

async fn query_node_status(target: SocketAddrV4, timeout: Duration) -> Result<String, ProbeError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    let transaction_id: u16 = rand::random();
    socket
        .send_to(&netbios::create_node_status_request(transaction_id), target)
        .await?;

    let deadline = Instant::now() + timeout;
    let mut buf = [0u8; RECV_BUFFER];
    loop {
        let (len, from) = tokio::time::timeout_at(deadline, socket.recv_from(&mut buf))
            .await
            .map_err(|_| ProbeError::Timeout)??;
        if from.ip() != IpAddr::V4(*target.ip()) {
            continue;
        }
        match netbios::parse_node_status_response(&buf[..len], transaction_id) {
            Ok(name) => return Ok(name),
            Err(e) => debug!("Ignoring NetBIOS packet from {from}: {e}"),
        }
    }
}

fn is_real_name(host: &str, ip: Ipv4Addr) -> bool {
    !host.is_empty() && host != ip.to_string()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
