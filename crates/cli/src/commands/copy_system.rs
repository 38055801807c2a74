use anyhow::{Context, Result};
use symcache_core::services::{BinaryCachePopulator, CacheReport};
use symcache_core::tools::SystemTools;

use crate::commands::{load_settings, print_json, print_list};

/// Copy this machine's system binaries into the binary cache share.
pub fn copy_system_binaries_command(config: Option<&str>, json: bool) -> Result<CacheReport> {
    let settings = load_settings(config)?;
    let tools = SystemTools::new(settings.tools.clone());
    let populator = BinaryCachePopulator::new(&settings.binary_cache, &tools);
    let report = populator.run().context("Failed to populate binary cache")?;

    if json {
        print_json(&report)?;
    } else {
        print_cache_report(&report);
    }
    Ok(report)
}

fn print_cache_report(report: &CacheReport) {
    println!("Populated binary cache for macOS {}:", report.os_version);
    println!("  Run dir: {}", report.run_dir.display());
    println!("  Binaries copied: {}", report.copied.len());
    println!("  Shared caches extracted: {}", report.extracted_caches.len());
    let missing: Vec<_> = report.missing_search_dirs.iter().map(|p| p.display()).collect();
    print_list("Missing search dirs", &missing);
    print_list("Unexpected shared cache entries", &report.unexpected_shared_cache_entries);
}
