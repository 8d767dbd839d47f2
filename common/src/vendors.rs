//! MAC prefix to manufacturer mapping.
//!
//! [`VendorTable`] is the in-memory form of the vendor database. Lookups are
//! keyed on the first 6 hex digits of a MAC address, case-insensitive and
//! independent of the separator style (`AA:BB:CC`, `aa-bb-cc`, `aabb.cc..`).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::network::device::UNKNOWN;

/// Number of hex digits in an OUI.
pub const PREFIX_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorEntry {
    pub mac_prefix: String,
    pub vendor_name: String,
}

impl VendorEntry {
    pub fn new(mac_prefix: impl Into<String>, vendor_name: impl Into<String>) -> Self {
        Self {
            mac_prefix: mac_prefix.into(),
            vendor_name: vendor_name.into(),
        }
    }
}

/// Resolves device manufacturers from MAC addresses.
pub trait VendorRepository: Send + Sync {
    /// Retrieves the vendor name for a MAC address, or `None` if the OUI is unknown.
    fn get_vendor(&self, mac: &str) -> Option<String>;

    /// Like [`VendorRepository::get_vendor`], but never fails: unmatched,
    /// empty or unparsable input yields [`UNKNOWN`].
    fn vendor_for(&self, mac: &str) -> String {
        self.get_vendor(mac).unwrap_or_else(|| UNKNOWN.to_string())
    }
}

/// Extracts the uppercase 6-hex-digit OUI from a MAC address or prefix string.
///
/// Separators are ignored. Returns `None` when fewer than 6 hex digits lead
/// the string.
pub fn oui_prefix(mac: &str) -> Option<String> {
    let mut prefix = String::with_capacity(PREFIX_LEN);
    for c in mac.chars() {
        if prefix.len() == PREFIX_LEN {
            break;
        }
        match c {
            ':' | '-' | '.' | ' ' => continue,
            c if c.is_ascii_hexdigit() => prefix.push(c.to_ascii_uppercase()),
            _ => return None,
        }
    }
    (prefix.len() == PREFIX_LEN).then_some(prefix)
}

/// Normalizes the prefix of a database entry.
///
/// Unlike [`oui_prefix`] the whole string must be exactly one OUI; longer
/// MA-M and MA-S block prefixes yield `None`.
pub fn entry_prefix(prefix: &str) -> Option<String> {
    let mut digits = String::with_capacity(PREFIX_LEN);
    for c in prefix.chars() {
        match c {
            ':' | '-' | '.' | ' ' => continue,
            c if c.is_ascii_hexdigit() && digits.len() < PREFIX_LEN => {
                digits.push(c.to_ascii_uppercase())
            }
            _ => return None,
        }
    }
    (digits.len() == PREFIX_LEN).then_some(digits)
}

#[derive(Debug, Clone, Default)]
pub struct VendorTable {
    by_prefix: HashMap<String, String>,
}

impl VendorTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table; the first entry for a given OUI wins. Entries whose
    /// prefix is not exactly one OUI are skipped.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = VendorEntry>,
    {
        let mut by_prefix: HashMap<String, String> = HashMap::new();
        for entry in entries {
            if let Some(prefix) = entry_prefix(&entry.mac_prefix) {
                by_prefix.entry(prefix).or_insert(entry.vendor_name);
            }
        }
        Self { by_prefix }
    }

    /// Parses the JSON array format served by the vendor source.
    ///
    /// Objects may carry extra fields; they are ignored.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let entries: Vec<VendorEntry> = serde_json::from_slice(bytes)?;
        Ok(Self::from_entries(entries))
    }

    pub fn lookup(&self, mac: &str) -> Option<&str> {
        let prefix = oui_prefix(mac)?;
        self.by_prefix.get(&prefix).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_prefix.is_empty()
    }
}

impl VendorRepository for VendorTable {
    fn get_vendor(&self, mac: &str) -> Option<String> {
        self.lookup(mac).map(str::to_string)
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
