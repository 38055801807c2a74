use std::path::{Path, PathBuf};

use crate::model::BinaryUuid;

/// Logical layout of a UUID database on disk.
///
/// Pure path arithmetic; it does not touch the filesystem.
#[derive(Debug, Clone)]
pub struct UuidDbLayout {
    /// Root directory of the database.
    pub root: PathBuf,
}

impl UuidDbLayout {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// `<root>/XXXX/XXXX/XXXX/XXXX/XXXX/XXXXXXXXXXXX` for `uuid`.
    pub fn record_path(&self, uuid: &BinaryUuid) -> PathBuf {
        self.root.join(uuid.relative_path())
    }

    /// Record path relative to the root, `/`-separated.
    pub fn record_key(uuid: &BinaryUuid) -> String {
        uuid.path_segments().join("/")
    }
}
