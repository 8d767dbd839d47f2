//! Vendor database backed by a local JSON cache and a remote source.
//!
//! The cache file is trusted while it is younger than
//! [`VendorConfig::max_age`]; otherwise [`VendorDatabase::load`] fetches a new
//! copy first. Every failure path degrades to a smaller (possibly empty) table
//! so lookups keep answering `"Unknown"` instead of failing a scan.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use netsweep_common::config::VendorConfig;
use netsweep_common::vendors::{VendorRepository, VendorTable};
use netsweep_common::{debug, info, success, warn};
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

static SHARED: OnceCell<Arc<VendorDatabase>> = OnceCell::const_new();

#[derive(Debug, Error)]
pub enum VendorError {
    #[error("vendor source request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vendor source answered with HTTP {0}")]
    Status(u16),

    #[error("vendor cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("vendor data is not a JSON array of entries: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct VendorDatabase {
    config: VendorConfig,
    client: reqwest::Client,
    table: RwLock<Arc<VendorTable>>,
    refresh_lock: Mutex<()>,
    /// Completed refresh attempts; lets coalesced callers detect that someone
    /// else finished while they were waiting.
    attempts: AtomicU64,
    last_refresh_ok: AtomicBool,
}

impl VendorDatabase {
    /// Creates an empty database. Nothing is read or fetched until [`load`](Self::load).
    pub fn new(config: VendorConfig) -> Result<Self, VendorError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            config,
            client,
            table: RwLock::new(Arc::new(VendorTable::empty())),
            refresh_lock: Mutex::new(()),
            attempts: AtomicU64::new(0),
            last_refresh_ok: AtomicBool::new(false),
        })
    }

    /// The process-wide instance, created and loaded on first use.
    ///
    /// Later calls return the same instance regardless of `config`.
    pub async fn shared(config: &VendorConfig) -> Result<Arc<VendorDatabase>, VendorError> {
        SHARED
            .get_or_try_init(|| async {
                let db = VendorDatabase::new(config.clone())?;
                db.load().await;
                Ok::<_, VendorError>(Arc::new(db))
            })
            .await
            .map(Arc::clone)
    }

    /// Populates the in-memory table from the cache file, refreshing it first
    /// when it is missing or stale.
    ///
    /// Never fails: an unreadable or undecodable cache yields an empty table.
    pub async fn load(&self) -> Arc<VendorTable> {
        let path = self.config.cache_file();
        if !self.is_fresh(&path).await {
            info!("Vendor cache at {} is missing or stale, refreshing", path.display());
            if self.refresh().await {
                return self.snapshot();
            }
        }

        let table = match read_cache(&path).await {
            Ok(table) => {
                debug!("Loaded {} vendor prefixes from {}", table.len(), path.display());
                table
            }
            Err(e) => {
                warn!("Could not load vendor cache {}: {e}", path.display());
                VendorTable::empty()
            }
        };
        self.install(table)
    }

    /// Downloads the vendor list, rewrites the cache file and swaps the
    /// in-memory table.
    ///
    /// A download that decodes is installed even if the cache file cannot be
    /// written. On failure the current table and file are left untouched. Concurrent
    /// callers are coalesced onto a single request; the return value reports
    /// whether the attempt the caller waited on succeeded.
    pub async fn refresh(&self) -> bool {
        let observed = self.attempts.load(Ordering::Acquire);
        let _guard = self.refresh_lock.lock().await;
        if self.attempts.load(Ordering::Acquire) != observed {
            return self.last_refresh_ok.load(Ordering::Acquire);
        }

        let ok = match self.fetch_and_store().await {
            Ok(table) => {
                success!("Vendor database updated ({} prefixes)", table.len());
                self.install(table);
                true
            }
            Err(e) => {
                warn!("Vendor database refresh from {} failed: {e}", self.config.source_url);
                false
            }
        };

        self.last_refresh_ok.store(ok, Ordering::Release);
        self.attempts.fetch_add(1, Ordering::AcqRel);
        ok
    }

    /// A consistent view of the current table.
    pub fn snapshot(&self) -> Arc<VendorTable> {
        let guard = self.table.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    fn install(&self, table: VendorTable) -> Arc<VendorTable> {
        let table = Arc::new(table);
        let mut guard = self.table.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::clone(&table);
        table
    }

    async fn is_fresh(&self, path: &Path) -> bool {
        let Ok(modified) = tokio::fs::metadata(path).await.and_then(|m| m.modified()) else {
            return false;
        };
        match SystemTime::now().duration_since(modified) {
            Ok(age) => age < self.config.max_age,
            // mtime in the future
            Err(_) => true,
        }
    }

    async fn fetch_and_store(&self) -> Result<VendorTable, VendorError> {
        let response = self.client.get(&self.config.source_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(VendorError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        let table = VendorTable::from_json(&body)?;
        let path = self.config.cache_file();
        if let Err(e) = write_cache(&path, &body).await {
            warn!("Could not write vendor cache {}: {e}", path.display());
        }
        Ok(table)
    }
}

impl VendorRepository for VendorDatabase {
    fn get_vendor(&self, mac: &str) -> Option<String> {
        self.snapshot().get_vendor(mac)
    }
}

async fn read_cache(path: &Path) -> Result<VendorTable, VendorError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(VendorTable::from_json(&bytes)?)
}

/// Writes next to the target and renames, so readers never see a partial file.
async fn write_cache(path: &Path, body: &[u8]) -> Result<(), VendorError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await?;
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
