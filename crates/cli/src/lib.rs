//! Shared plumbing for the `copy-system-binaries`, `rebuild-uuid-database`
//! and `lookup-uuid` binaries. All substantive logic lives in
//! `symcache-core`; this crate parses arguments, loads settings, sets up
//! logging, and prints reports.

pub mod commands;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use symcache_core::config::expand_home;
use tracing::Level;

/// Expand a leading `~` and make the path absolute against the current
/// working directory. The path does not need to exist.
pub fn resolve_dir(raw: &str) -> Result<PathBuf> {
    let path = expand_home(Path::new(raw));
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}

/// Parse command-line arguments. Usage errors print to stderr and exit with
/// status 1; `--help` and `--version` behave as usual.
pub fn parse_args<P: Parser>() -> P {
    match P::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    }
}

/// Install a stderr `tracing` subscriber at INFO, or DEBUG when `verbose`.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
