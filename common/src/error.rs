use std::io;
use std::net::Ipv4Addr;

use thiserror::Error;

/// Rejection of a subnet string before any probing begins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubnetError {
    #[error("invalid subnet '{input}': {reason}")]
    Malformed { input: String, reason: String },

    #[error("invalid subnet '{input}': prefix /{prefix} is out of range (0-32)")]
    PrefixOutOfRange { input: String, prefix: u32 },

    #[error("invalid subnet '{input}': IPv6 ranges are not supported")]
    Ipv6Unsupported { input: String },
}

/// Failure of a single probe operation against one address.
///
/// Never escapes the per-host scan; every variant collapses to "no answer".
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("timed out waiting for a reply")]
    Timeout,

    #[error("no reply received")]
    NoReply,

    #[error("insufficient privileges: {0}")]
    PermissionDenied(String),

    #[error("no local interface is attached to the network of {0}")]
    NoInterface(Ipv4Addr),

    #[error("probe unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(io::Error),
}

impl ProbeError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ProbeError::PermissionDenied(_))
    }
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied(err.to_string()),
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ProbeError::Timeout,
            _ => ProbeError::Io(err),
        }
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
