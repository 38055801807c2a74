use anyhow::Result;
use clap::Parser;
use symcache::commands::rebuild_uuid_database_command;
use symcache::{init_logging, parse_args};

/// Rebuild the UUID-to-binary database from the source folders listed in the
/// manifest on the symbol cache share.
#[derive(Parser, Debug)]
#[command(name = "rebuild-uuid-database", version, long_about = None)]
struct Cli {
    /// Root directory of the UUID database (created if missing).
    db_dir: String,

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
    rebuild_uuid_database_command(&cli.db_dir, cli.config.as_deref(), cli.json)?;
    Ok(())
}
