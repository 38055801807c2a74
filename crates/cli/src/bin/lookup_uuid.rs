use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use symcache::commands::lookup_uuid_command;
use symcache::{init_logging, parse_args};

/// Print the binary recorded for a UUID in the UUID database.
#[derive(Parser, Debug)]
#[command(name = "lookup-uuid", version, long_about = None)]
struct Cli {
    /// Root directory of the UUID database.
    db_dir: String,

    /// Binary UUID, e.g. C4CBD2CF-39D5-3185-851E-85C7DD2F8C7F.
    uuid: String,

    /// Settings file; its source root is used to build the absolute path.
    #[arg(long)]
    config: Option<String>,

    /// Emit the result as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<ExitCode> {
    let cli: Cli = parse_args();
    init_logging(false);
    let result = lookup_uuid_command(&cli.db_dir, &cli.uuid, cli.config.as_deref(), cli.json)?;
    Ok(if result.record.is_some() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
