use std::path::PathBuf;
use std::time::Duration;

/// File name of the vendor cache inside [`VendorConfig::data_dir`].
pub const VENDOR_FILE_NAME: &str = "mac_vendor_list.json";

pub const DEFAULT_VENDOR_URL: &str = "https://maclookup.app/downloads/json-database/get-db";

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Decides whether MAC/name resolution runs for hosts that fail the ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvePolicy {
    /// Unreachable hosts are skipped without further probing.
    #[default]
    ReachableOnly,
    /// Every address gets an ARP attempt; a host that answers ARP but not ICMP
    /// is reported without latency.
    Always,
}

/// Settings for one scan pass.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Upper bound on probes in flight at the same time.
    pub concurrency: usize,

    pub ping_timeout: Duration,

    pub arp_timeout: Duration,

    /// Budget for reverse DNS and the NetBIOS fallback combined.
    pub name_timeout: Duration,

    pub policy: ResolvePolicy,

    /// Disables name resolution entirely. Names are reported as unknown.
    pub no_names: bool,

    /// Consult the operating system's neighbor table before sending ARP.
    pub use_neighbor_cache: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: 64,
            ping_timeout: Duration::from_secs(1),
            arp_timeout: Duration::from_secs(2),
            name_timeout: Duration::from_secs(2),
            policy: ResolvePolicy::default(),
            no_names: false,
            use_neighbor_cache: true,
        }
    }
}

/// Where the vendor database lives and how it is refreshed.
#[derive(Debug, Clone)]
pub struct VendorConfig {
    pub data_dir: PathBuf,
    pub source_url: String,
    /// Cache files older than this are re-fetched on load.
    pub max_age: Duration,
    pub http_timeout: Duration,
}

impl VendorConfig {
    pub fn cache_file(&self) -> PathBuf {
        self.data_dir.join(VENDOR_FILE_NAME)
    }
}

impl Default for VendorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            source_url: DEFAULT_VENDOR_URL.to_string(),
            max_age: Duration::from_secs(60 * SECS_PER_DAY),
            http_timeout: Duration::from_secs(30),
        }
    }
}
