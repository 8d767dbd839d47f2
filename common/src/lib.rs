//! # Netsweep Common
//!
//! Shared domain model for the discovery engine: the subnet and device types,
//! the probe and vendor abstractions, configuration and error types.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod scanning;
pub mod vendors;

#[doc(hidden)]
pub use tracing;
