//! # Netsweep Core
//!
//! The discovery engine: the vendor database, the network-backed host probe
//! and the coordinator that fans probes out over a subnet.

pub mod network;
pub mod probe;
pub mod scanner;
pub mod vendors;

pub use probe::NetworkProbe;
pub use scanner::{ScanCoordinator, scan_host};
pub use vendors::{VendorDatabase, VendorError};
