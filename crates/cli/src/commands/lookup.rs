use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use symcache_core::db::UuidDb;

use crate::commands::{load_settings, print_json};
use crate::resolve_dir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    pub uuid: String,
    /// Path recorded in the database, relative to the source root.
    pub record: Option<String>,
    /// Absolute binary location below the configured source root.
    pub binary: Option<PathBuf>,
}

/// Resolve `uuid` to the binary recorded for it.
pub fn lookup_uuid_command(
    db_dir: &str,
    uuid: &str,
    config: Option<&str>,
    json: bool,
) -> Result<LookupResult> {
    let settings = load_settings(config)?;
    let db_root = resolve_dir(db_dir)?;
    let db = UuidDb::open(&db_root)?;
    let record = db.lookup(uuid).with_context(|| format!("Failed to look up {uuid}"))?;
    let binary = record.as_ref().map(|rel| settings.uuid_db.source_root().join(rel));
    let result = LookupResult { uuid: uuid.trim().to_ascii_uppercase(), record, binary };

    if json {
        print_json(&result)?;
    } else {
        match (&result.record, &result.binary) {
            (Some(record), Some(binary)) => {
                println!("{}", record);
                println!("Binary: {}", binary.display());
            }
            _ => println!("No binary recorded for {}", result.uuid),
        }
    }
    Ok(result)
}
