use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use netsweep_common::config::VendorConfig;
use netsweep_common::error::ProbeError;
use netsweep_common::scanning::HostProbe;
use pnet::util::MacAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const ACME_JSON: &str = r#"[{"macPrefix":"AA:BB:CC","vendorName":"Acme","private":false,"blockType":"MA-L","lastUpdate":"2020/01/01"}]"#;

/// Scripted behavior of one simulated host.
#[derive(Clone, Default)]
pub struct MockHost {
    pub latency: Option<Duration>,
    pub mac: Option<MacAddr>,
    pub name: Option<String>,
}

impl MockHost {
    pub fn alive(mac: MacAddr, latency_ms: u64) -> Self {
        Self {
            latency: Some(Duration::from_millis(latency_ms)),
            mac: Some(mac),
            name: None,
        }
    }

    /// Answers ARP but drops ICMP.
    pub fn firewalled(mac: MacAddr) -> Self {
        Self {
            latency: None,
            mac: Some(mac),
            name: None,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// A [`HostProbe`] driven by a table of simulated hosts. Addresses missing
/// from the table never answer anything.
#[derive(Default)]
pub struct MockProbe {
    hosts: HashMap<Ipv4Addr, MockHost>,
    delay: Duration,
    jitter: bool,
    crash_on: Option<Ipv4Addr>,
    pub pings: AtomicUsize,
    pub resolutions: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

struct InFlight<'a>(&'a MockProbe);

impl<'a> InFlight<'a> {
    fn enter(probe: &'a MockProbe) -> Self {
        let now = probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        probe.peak.fetch_max(now, Ordering::SeqCst);
        Self(probe)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, ip: Ipv4Addr, host: MockHost) -> Self {
        self.hosts.insert(ip, host);
        self
    }

    /// Makes every ping take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Adds up to 3 ms of random extra latency to every echo reply.
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    /// Makes the ping for `ip` panic, as a buggy probe implementation would.
    pub fn with_crash_on(mut self, ip: Ipv4Addr) -> Self {
        self.crash_on = Some(ip);
        self
    }

    fn host(&self, ip: Ipv4Addr) -> Option<&MockHost> {
        self.hosts.get(&ip)
    }
}

#[async_trait]
impl HostProbe for MockProbe {
    async fn ping(&self, ip: Ipv4Addr) -> Result<Duration, ProbeError> {
        let _guard = InFlight::enter(self);
        self.pings.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.crash_on == Some(ip) {
            panic!("simulated probe crash for {ip}");
        }
        let latency = self.host(ip).and_then(|h| h.latency).ok_or(ProbeError::Timeout)?;
        if self.jitter {
            return Ok(latency + Duration::from_micros(rand::random_range(0..3_000)));
        }
        Ok(latency)
    }

    async fn resolve_mac(&self, ip: Ipv4Addr) -> Result<MacAddr, ProbeError> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        self.host(ip).and_then(|h| h.mac).ok_or(ProbeError::Timeout)
    }

    async fn resolve_name(&self, ip: Ipv4Addr) -> Result<String, ProbeError> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        self.host(ip)
            .and_then(|h| h.name.clone())
            .ok_or(ProbeError::NoReply)
    }
}

pub fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("netsweep-{tag}-{}", rand::random::<u64>()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn vendor_config(data_dir: PathBuf, source_url: &str) -> VendorConfig {
    VendorConfig {
        data_dir,
        source_url: source_url.to_string(),
        max_age: Duration::from_secs(3600),
        http_timeout: Duration::from_secs(5),
    }
}

/// Nothing listens on the discard port of the loopback address.
pub const UNREACHABLE_SOURCE: &str = "http://127.0.0.1:9/get-db";

/// A loopback HTTP responder serving one canned body.
pub struct VendorServer {
    pub url: String,
    pub hits: Arc<AtomicUsize>,
}

impl VendorServer {
    pub async fn start(status: u16, body: &'static str, delay: Duration) -> Self {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_ref = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                hits_ref.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = stream.read(&mut buf).await;
                    tokio::time::sleep(delay).await;
                    let reason = if status == 200 { "OK" } else { "Error" };
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            url: format!("http://{addr}/get-db"),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
