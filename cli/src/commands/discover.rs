use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::*;
use netsweep_common::config::VendorConfig;
use netsweep_common::network::device::ScanResult;
use netsweep_common::network::interface;
use netsweep_common::network::subnet::Subnet;
use netsweep_common::vendors::{VendorRepository, VendorTable};
use netsweep_common::{info, success, warn};
use netsweep_core::{NetworkProbe, ScanCoordinator, VendorDatabase};

use crate::mprint;
use crate::terminal::input::InputHandle;
use crate::terminal::{colors, format, print, spinner};

use super::DiscoverArgs;

const LAN_KEYWORD: &str = "lan";

pub async fn discover(args: DiscoverArgs, vendor_cfg: &VendorConfig, q_level: u8) -> anyhow::Result<()> {
    let subnet: Subnet = resolve_target(&args.target)?;
    let scan_cfg = args.scan_config();

    if !is_root::is_root() {
        warn!("Not running as root: ICMP and raw ARP may be refused, MACs then come from the neighbor table only");
    }

    let vendors: Arc<dyn VendorRepository> = match VendorDatabase::shared(vendor_cfg).await {
        Ok(db) => {
            info!("Vendor database ready ({} prefixes)", db.len());
            db
        }
        Err(e) => {
            warn!("Vendor database unavailable, vendors will be Unknown: {e}");
            Arc::new(VendorTable::empty())
        }
    };

    let probe = Arc::new(NetworkProbe::new(scan_cfg.clone()));
    let coordinator = ScanCoordinator::new(probe, vendors)
        .with_policy(scan_cfg.policy)
        .with_progress(spinner::report_discovery_progress);

    spinner::start();
    let mut input = InputHandle::new();
    input.start();

    let outcome: Option<ScanResult> = tokio::select! {
        result = coordinator.scan(&subnet, scan_cfg.concurrency) => Some(result),
        _ = input.interrupted() => None,
    };

    drop(input);
    spinner::finish();

    let Some(mut result) = outcome else {
        warn!("Discovery of {subnet} abandoned, no results were kept");
        return Ok(());
    };

    result.sort_by_ip();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    discovery_ends(&result, q_level);
    Ok(())
}

/// Parses the target argument; `lan` picks the best local interface's network.
fn resolve_target(target: &str) -> anyhow::Result<Subnet> {
    if target.eq_ignore_ascii_case(LAN_KEYWORD) {
        let subnet = interface::get_lan_network()?
            .context("the LAN interface has no private IPv4 network")?;
        info!("Using LAN network {subnet}");
        return Ok(subnet);
    }
    Ok(target.parse::<Subnet>()?)
}

fn discovery_ends(result: &ScanResult, q_level: u8) {
    if result.is_empty() {
        no_hosts_found(q_level);
        return;
    }

    if q_level > 0 {
        mprint!();
    }

    print::header("Network Discovery", q_level);
    print_devices(result, q_level);
    print_summary(result.len(), result.hosts_probed(), result.elapsed(), q_level);
}

fn no_hosts_found(q_level: u8) {
    print::header("ZERO HOSTS DETECTED", q_level);
    if q_level < 2 {
        print::no_results();
    }
}

fn print_devices(result: &ScanResult, q_level: u8) {
    for (idx, record) in result.iter().enumerate() {
        if q_level < 2 {
            print::tree_head(idx, &format::device_title(record));
            print::as_tree_one_level(format::device_details(record));
        }
        if idx + 1 != result.len() {
            mprint!();
        }
    }
}

fn print_summary(found: usize, probed: usize, total_time: Duration, q_level: u8) {
    let active_hosts: ColoredString = format!("{found} active hosts").bold().green();
    let probed: ColoredString = format!("{probed} addresses").bold();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Discovery Complete: {active_hosts} out of {probed} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match q_level {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => {
            mprint!();
            success!("{}", output)
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
