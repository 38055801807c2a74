use anyhow::Result;
use clap::Parser;
use symcache::commands::copy_system_binaries_command;
use symcache::{init_logging, parse_args};

/// Copy this machine's Mach-O system binaries and shared caches into the
/// binary cache share, under a directory named after the OS version and build.
#[derive(Parser, Debug)]
#[command(name = "copy-system-binaries", version, long_about = None)]
struct Cli {
    /// Settings file (JSON, or YAML with a .yaml/.yml extension).
    #[arg(long)]
    config: Option<String>,

    /// Emit the run report as JSON instead of human-readable text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log tool invocations and retries.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli: Cli = parse_args();
    init_logging(cli.verbose);
    copy_system_binaries_command(cli.config.as_deref(), cli.json)?;
    Ok(())
}
