//! NetBIOS Node Status (NBSTAT) codec, RFC 1002 section 4.2.17.
//!
//! Used as a fallback name source for hosts (mostly Windows and Samba boxes)
//! that carry no reverse DNS entry.

use anyhow::{Context, bail, ensure};

pub const NETBIOS_NS_PORT: u16 = 137;
pub const NBNS_HDR_LEN: usize = 12;

const NBSTAT_TYPE: u16 = 0x0021;
const IN_CLASS: u16 = 0x0001;
const RESPONSE_FLAG: u16 = 0x8000;
const GROUP_FLAG: u16 = 0x8000;
const NAME_ENTRY_LEN: usize = 18;
const WORKSTATION_SUFFIX: u8 = 0x00;

/// Builds a wildcard (`*`) node status request.
pub fn create_node_status_request(transaction_id: u16) -> Vec<u8> {
    let qname = encode_netbios_name(b"*");
    let mut buffer: Vec<u8> = Vec::with_capacity(NBNS_HDR_LEN + qname.len() + 4);

    buffer.extend_from_slice(&transaction_id.to_be_bytes());
    buffer.extend_from_slice(&0u16.to_be_bytes()); // flags
    buffer.extend_from_slice(&1u16.to_be_bytes()); // qdcount
    buffer.extend_from_slice(&[0u8; 6]); // ancount, nscount, arcount
    buffer.extend_from_slice(&qname);
    buffer.extend_from_slice(&NBSTAT_TYPE.to_be_bytes());
    buffer.extend_from_slice(&IN_CLASS.to_be_bytes());
    buffer
}

/// Extracts the machine name from a node status response.
///
/// Prefers the first unique name registered with the workstation suffix,
/// falling back to any name carrying that suffix.
pub fn parse_node_status_response(payload: &[u8], transaction_id: u16) -> anyhow::Result<String> {
    ensure!(payload.len() >= NBNS_HDR_LEN, "NBNS packet shorter than its header");

    let id = read_u16(payload, 0)?;
    ensure!(id == transaction_id, "transaction id mismatch: {id:#06x}");
    let flags = read_u16(payload, 2)?;
    ensure!(flags & RESPONSE_FLAG != 0, "packet is not a response");

    let mut cursor = skip_name(payload, NBNS_HDR_LEN)?;
    let rtype = read_u16(payload, cursor)?;
    ensure!(rtype == NBSTAT_TYPE, "unexpected record type {rtype:#06x}");
    // type, class, ttl, rdlength
    cursor += 2 + 2 + 4 + 2;

    let count = *payload.get(cursor).context("missing name count")? as usize;
    cursor += 1;

    let mut fallback: Option<String> = None;
    for index in 0..count {
        let start = cursor + index * NAME_ENTRY_LEN;
        let entry = payload
            .get(start..start + NAME_ENTRY_LEN)
            .context("name table truncated")?;
        if entry[15] != WORKSTATION_SUFFIX {
            continue;
        }
        let name = decode_entry_name(&entry[..15]);
        if name.is_empty() {
            continue;
        }
        let entry_flags = u16::from_be_bytes([entry[16], entry[17]]);
        if entry_flags & GROUP_FLAG == 0 {
            return Ok(name);
        }
        fallback.get_or_insert(name);
    }

    match fallback {
        Some(name) => Ok(name),
        None => bail!("no workstation name in node status response"),
    }
}

/// First-level encoding: pad to 16 bytes, split every byte into two nibbles
/// offset from 'A'.
fn encode_netbios_name(name: &[u8]) -> Vec<u8> {
    let mut padded = [0u8; 16];
    let len = name.len().min(16);
    padded[..len].copy_from_slice(&name[..len]);

    let mut encoded: Vec<u8> = Vec::with_capacity(34);
    encoded.push(32);
    for byte in padded {
        encoded.push(b'A' + (byte >> 4));
        encoded.push(b'A' + (byte & 0x0f));
    }
    encoded.push(0);
    encoded
}

fn skip_name(payload: &[u8], mut cursor: usize) -> anyhow::Result<usize> {
    loop {
        let len = *payload.get(cursor).context("name runs past end of packet")?;
        if len & 0xc0 == 0xc0 {
            return Ok(cursor + 2);
        }
        cursor += 1;
        if len == 0 {
            return Ok(cursor);
        }
        cursor += len as usize;
    }
}

fn decode_entry_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches([' ', '\0'])
        .trim()
        .to_string()
}

fn read_u16(payload: &[u8], at: usize) -> anyhow::Result<u16> {
    let bytes = payload.get(at..at + 2).context("packet truncated")?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
