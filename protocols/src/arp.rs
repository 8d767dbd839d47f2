use std::net::Ipv4Addr;

use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;
use thiserror::Error;

pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;

const BROADCAST_MAC: MacAddr = MacAddr(0xff, 0xff, 0xff, 0xff, 0xff, 0xff);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("buffer too small for an Ethernet header")]
    EthernetBuffer,
    #[error("buffer too small for an ARP payload")]
    ArpBuffer,
}

/// Builds a broadcast Ethernet frame carrying an ARP who-has for `target_addr`.
pub fn create_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
) -> Result<Vec<u8>, PacketError> {
    let mut buffer = vec![0u8; ETH_HDR_LEN + ARP_LEN];
    make_header(&mut buffer, src_mac, BROADCAST_MAC, EtherTypes::Arp)?;
    request_payload(&mut buffer, src_mac, src_addr, target_addr)?;
    Ok(buffer)
}

/// Returns the sender hardware address if `frame` is an ARP reply from `target`.
pub fn parse_reply(frame: &[u8], target: Ipv4Addr) -> Option<MacAddr> {
    let eth = EthernetPacket::new(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(eth.payload())?;
    let is_answer = arp.get_operation() == ArpOperations::Reply
        && arp.get_sender_proto_addr() == target;
    is_answer.then(|| arp.get_sender_hw_addr())
}

fn make_header(
    buffer: &mut [u8],
    src_mac: MacAddr,
    dst_mac: MacAddr,
    et: EtherType,
) -> Result<(), PacketError> {
    let mut eth = MutableEthernetPacket::new(buffer).ok_or(PacketError::EthernetBuffer)?;
    eth.set_source(src_mac);
    eth.set_destination(dst_mac);
    eth.set_ethertype(et);
    Ok(())
}

fn request_payload(
    buffer: &mut [u8],
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
) -> Result<(), PacketError> {
    if ETH_HDR_LEN + ARP_LEN > buffer.len() {
        return Err(PacketError::ArpBuffer);
    }
    let mut arp = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or(PacketError::ArpBuffer)?;
    arp.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp.set_protocol_type(EtherTypes::Ipv4);
    arp.set_hw_addr_len(6);
    arp.set_proto_addr_len(4);
    arp.set_operation(ArpOperations::Request);
    arp.set_sender_hw_addr(src_mac);
    arp.set_target_hw_addr(MacAddr::zero());
    arp.set_sender_proto_addr(src_addr);
    arp.set_target_proto_addr(target_addr);
    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
