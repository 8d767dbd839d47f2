use colored::*;
use netsweep_common::config::VendorConfig;
use netsweep_common::success;
use netsweep_common::vendors::{VendorRepository, oui_prefix};
use netsweep_core::VendorDatabase;

use crate::terminal::{colors, print};

/// Forces a download regardless of the cache's age.
pub async fn update(cfg: &VendorConfig) -> anyhow::Result<()> {
    let db = VendorDatabase::new(cfg.clone())?;
    if !db.refresh().await {
        anyhow::bail!("could not refresh the vendor database from {}", cfg.source_url);
    }
    let path = cfg.cache_file();
    if path.exists() {
        success!("{} vendor prefixes cached at {}", db.len(), path.display());
    }
    Ok(())
}

pub async fn lookup(mac: &str, cfg: &VendorConfig) -> anyhow::Result<()> {
    let db = VendorDatabase::shared(cfg).await?;
    let prefix = oui_prefix(mac).unwrap_or_else(|| "-".to_string());

    print::GLOBAL_KEY_WIDTH.set(6);
    print::aligned_line("MAC", mac.color(colors::MAC_ADDR));
    print::aligned_line("OUI", prefix);
    print::aligned_line("Vendor", db.vendor_for(mac).color(colors::VENDOR));
    Ok(())
}
