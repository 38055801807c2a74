use anyhow::{Context, Result};
use symcache_core::db::UuidDb;
use symcache_core::services::{UuidDbBuilder, UuidDbReport};
use symcache_core::tools::SystemTools;

use crate::commands::{load_settings, print_json, print_list};
use crate::resolve_dir;

/// Rebuild the UUID database at `db_dir` from the sources in the manifest.
pub fn rebuild_uuid_database_command(
    db_dir: &str,
    config: Option<&str>,
    json: bool,
) -> Result<UuidDbReport> {
    let settings = load_settings(config)?;
    let db_root = resolve_dir(db_dir)?;
    let db = UuidDb::create(&db_root, settings.uuid_db.write_retry)
        .with_context(|| format!("Failed to create UUID database at {}", db_root.display()))?;

    let tools = SystemTools::new(settings.tools.clone());
    let report = UuidDbBuilder::new(&settings.uuid_db, &tools, &db)
        .run()
        .context("Failed to rebuild UUID database")?;

    if json {
        print_json(&report)?;
    } else {
        print_uuid_db_report(&report);
    }
    Ok(report)
}

fn print_uuid_db_report(report: &UuidDbReport) {
    println!("Rebuilt UUID database:");
    println!("  DB: {}", report.db_root.display());
    println!("  Manifest: {}", report.manifest.display());
    println!("  Sources: {}", report.sources.len());
    println!("  Binaries scanned: {}", report.binaries_scanned);
    println!("  UUIDs recorded: {}", report.records.len());
    let missing_sources: Vec<_> = report.missing_sources.iter().map(|p| p.display()).collect();
    print_list("Missing source folders", &missing_sources);
    let missing_uuid: Vec<String> = report
        .missing_uuid
        .iter()
        .map(|m| match &m.arch {
            Some(arch) => format!("{} ({arch})", m.path.display()),
            None => m.path.display().to_string(),
        })
        .collect();
    print_list("No UUID found", &missing_uuid);
}
