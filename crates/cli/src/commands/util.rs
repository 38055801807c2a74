use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use symcache_core::config::Settings;

/// Load settings from `--config`, or defaults when none was given.
pub fn load_settings(config: Option<&str>) -> Result<Settings> {
    Settings::load_or_default(config.map(Path::new))
        .with_context(|| format!("Failed to load settings from {}", config.unwrap_or("defaults")))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Helper to print an indented list under a label, skipping empty lists.
pub fn print_list<T: std::fmt::Display>(label: &str, items: &[T]) {
    if items.is_empty() {
        return;
    }
    println!("  {label}:");
    for item in items {
        println!("    - {item}");
    }
}
