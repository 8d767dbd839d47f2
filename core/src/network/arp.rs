//! Link-layer address resolution.
//!
//! The kernel's neighbor table is consulted first; on a miss a single ARP
//! who-has is broadcast from the interface attached to the target's network
//! and the first matching reply wins. Raw link-layer access normally requires
//! root or `CAP_NET_RAW`.

use std::io;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use netsweep_common::error::ProbeError;
use netsweep_common::network::interface::{self, LinkSource};
use netsweep_protocols::arp;
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use pnet::util::MacAddr;

const NEIGHBOR_TABLE: &str = "/proc/net/arp";
/// `ATF_COM`: the entry holds a resolved hardware address.
const ATF_COM: u32 = 0x02;
const READ_TIMEOUT: Duration = Duration::from_millis(50);
/// Slack for the blocking task to notice its own deadline.
const JOIN_GRACE: Duration = Duration::from_millis(250);

type EthChannel = (Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>);

/// Looks `target` up in the operating system's neighbor table.
pub async fn lookup_neighbor(target: Ipv4Addr) -> Option<MacAddr> {
    let contents = tokio::fs::read_to_string(NEIGHBOR_TABLE).await.ok()?;
    parse_neighbor_table(&contents, target)
}

/// Parses the `/proc/net/arp` format, returning only completed entries.
pub fn parse_neighbor_table(contents: &str, target: Ipv4Addr) -> Option<MacAddr> {
    contents.lines().skip(1).find_map(|line| {
        let mut fields = line.split_whitespace();
        let ip: Ipv4Addr = fields.next()?.parse().ok()?;
        if ip != target {
            return None;
        }
        let _hw_type = fields.next()?;
        let flags = u32::from_str_radix(fields.next()?.trim_start_matches("0x"), 16).ok()?;
        let mac: MacAddr = fields.next()?.parse().ok()?;
        (flags & ATF_COM != 0 && mac != MacAddr::zero()).then_some(mac)
    })
}

/// Broadcasts an ARP request for `target` and waits up to `timeout` for the answer.
pub async fn request(target: Ipv4Addr, timeout: Duration) -> Result<MacAddr, ProbeError> {
    let source = interface::find_link_source(&interface::usable_interfaces(), target)?;
    let task = tokio::task::spawn_blocking(move || {
        request_blocking(&source, target, timeout, datalink::channel)
    });

    match tokio::time::timeout(timeout + JOIN_GRACE, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ProbeError::Unavailable(join_err.to_string())),
        Err(_) => Err(ProbeError::Timeout),
    }
}

fn request_blocking<F>(
    source: &LinkSource,
    target: Ipv4Addr,
    timeout: Duration,
    channel_opener: F,
) -> Result<MacAddr, ProbeError>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    let (mut tx, mut rx) = open_eth_channel(&source.interface, &channel_config(), channel_opener)?;
    let frame = arp::create_request(source.mac, source.ip, target)
        .map_err(|e| ProbeError::Unavailable(e.to_string()))?;

    match tx.send_to(&frame, None) {
        Some(Ok(())) => {}
        Some(Err(e)) => return Err(e.into()),
        None => {
            return Err(ProbeError::Unavailable(format!(
                "{} refused the frame",
                source.interface.name
            )));
        }
    }

    await_reply(rx.as_mut(), target, Instant::now() + timeout)
}

fn open_eth_channel<F>(
    intf: &NetworkInterface,
    cfg: &Config,
    channel_opener: F,
) -> Result<EthChannel, ProbeError>
where
    F: FnOnce(&NetworkInterface, Config) -> io::Result<Channel>,
{
    match channel_opener(intf, *cfg).map_err(|e| opening_error(intf, e))? {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => Err(ProbeError::Unavailable(format!(
            "non-ethernet channel for {}",
            intf.name
        ))),
    }
}

fn opening_error(intf: &NetworkInterface, err: io::Error) -> ProbeError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied(format!(
            "opening a raw socket on {}: {err}",
            intf.name
        )),
        _ => ProbeError::from(err),
    }
}

/// Reads frames until an ARP reply from `target` arrives or `deadline` passes.
fn await_reply(
    rx: &mut dyn DataLinkReceiver,
    target: Ipv4Addr,
    deadline: Instant,
) -> Result<MacAddr, ProbeError> {
    while Instant::now() < deadline {
        match rx.next() {
            Ok(frame) => {
                if let Some(mac) = arp::parse_reply(frame, target) {
                    return Ok(mac);
                }
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Err(ProbeError::Timeout)
}

fn channel_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
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
