use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::BinaryUuid;

/// One record written to the UUID database during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UuidRecord {
    pub uuid: BinaryUuid,
    /// Slice architecture for fat binaries; `None` for thin binaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Binary path relative to the source root, as stored in the record.
    pub source: String,
    /// Absolute location of the record file.
    pub record_path: PathBuf,
}
