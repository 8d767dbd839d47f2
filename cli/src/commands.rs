pub mod discover;
pub mod vendors;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use netsweep_common::config::{DEFAULT_VENDOR_URL, ResolvePolicy, ScanConfig, VendorConfig};

#[derive(Parser)]
#[command(name = "netsweep")]
#[command(version, about = "Find the devices living on your local network.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory holding the vendor database cache
    #[arg(long, global = true, env = "NETSWEEP_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Where the vendor database is downloaded from
    #[arg(long, global = true, env = "NETSWEEP_VENDOR_URL", default_value = DEFAULT_VENDOR_URL)]
    pub vendor_url: String,

    /// Less output; repeat to silence informational logs
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// More output; repeat for trace logs
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover live hosts in a subnet, or on the local LAN with `lan`
    #[command(alias = "d")]
    Discover(DiscoverArgs),
    /// Manage the MAC vendor database
    #[command(alias = "v")]
    Vendors {
        #[command(subcommand)]
        action: VendorAction,
    },
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// CIDR range such as 192.168.1.0/24, a single address, or `lan`
    pub target: String,

    /// Maximum number of hosts probed at the same time
    #[arg(short, long, default_value_t = ScanConfig::default().concurrency)]
    pub concurrency: usize,

    /// Resolve MAC addresses even for hosts that ignore ping
    #[arg(long)]
    pub always_resolve: bool,

    /// Skip reverse DNS and NetBIOS name lookups
    #[arg(long)]
    pub no_names: bool,

    /// Always send ARP instead of reading the system neighbor table first
    #[arg(long)]
    pub no_neighbor_cache: bool,

    /// Print the result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum VendorAction {
    /// Download a fresh copy of the vendor database
    Update,
    /// Print the vendor registered for a MAC address
    Lookup { mac: String },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn vendor_config(&self) -> VendorConfig {
        VendorConfig {
            data_dir: self.data_dir.clone(),
            source_url: self.vendor_url.clone(),
            ..VendorConfig::default()
        }
    }
}

impl DiscoverArgs {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            concurrency: self.concurrency,
            policy: if self.always_resolve {
                ResolvePolicy::Always
            } else {
                ResolvePolicy::ReachableOnly
            },
            no_names: self.no_names,
            use_neighbor_cache: !self.no_neighbor_cache,
            ..ScanConfig::default()
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
