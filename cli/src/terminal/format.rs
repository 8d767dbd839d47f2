use colored::*;
use netsweep_common::network::device::{DeviceRecord, UNKNOWN};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

/// Tree title for a device: its name when one was resolved, its address otherwise.
pub fn device_title(record: &DeviceRecord) -> String {
    if record.name == UNKNOWN {
        record.ip.to_string()
    } else {
        record.name.clone()
    }
}

pub fn device_details(record: &DeviceRecord) -> Vec<Detail> {
    vec![
        ("IPv4".to_string(), record.ip.to_string().color(colors::IPV4_ADDR)),
        ("MAC".to_string(), or_unknown(&record.mac, colors::MAC_ADDR)),
        ("Vendor".to_string(), or_unknown(&record.vendor, colors::VENDOR)),
        ("Latency".to_string(), latency(record.latency_ms)),
    ]
}

fn or_unknown(value: &str, color: Color) -> ColoredString {
    if value == UNKNOWN {
        value.color(colors::UNKNOWN).italic()
    } else {
        value.color(color)
    }
}

fn latency(latency_ms: Option<u64>) -> ColoredString {
    match latency_ms {
        Some(ms) => format!("{ms} ms").color(colors::TEXT_DEFAULT),
        None => "no ICMP reply".color(colors::UNKNOWN).italic(),
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
