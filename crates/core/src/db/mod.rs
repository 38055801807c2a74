//! UUID-to-binary database.
//!
//! The database is a plain directory tree. Each binary UUID owns one file at
//! a six-level sharded path (see [`UuidDbLayout`]) whose single line is the
//! binary's path relative to the source root. The layout is the one lldb
//! uses for its UUID-to-dSYM map, so both indexes can share tooling.
//!
//! Writes truncate any existing record: the last binary seen for a UUID wins.

mod layout;
mod models;

pub use layout::UuidDbLayout;
pub use models::UuidRecord;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::RetryPolicy;
use crate::model::{BinaryUuid, InvalidUuid};
use crate::retry::{retry_on_would_block, RetryError};

/// Error type for UUID database operations.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The record stayed locked for every attempt of the retry policy.
    #[error("Timed out after {attempts} attempts waiting for lock on {path}")]
    LockTimeout { path: PathBuf, attempts: u32 },

    #[error(transparent)]
    InvalidUuid(#[from] InvalidUuid),

    #[error("UUID database not found at {0}")]
    MissingRoot(PathBuf),
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// Handle on a UUID database rooted at a directory.
#[derive(Debug, Clone)]
pub struct UuidDb {
    layout: UuidDbLayout,
    retry: RetryPolicy,
}

impl UuidDb {
    /// Open a database, creating the root directory if needed.
    pub fn create(root: impl AsRef<Path>, retry: RetryPolicy) -> DbResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root)
            .map_err(|source| DbError::Io { path: root.to_path_buf(), source })?;
        Ok(Self { layout: UuidDbLayout::new(root), retry })
    }

    /// Open an existing database for lookups.
    pub fn open(root: impl AsRef<Path>) -> DbResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(DbError::MissingRoot(root.to_path_buf()));
        }
        Ok(Self { layout: UuidDbLayout::new(root), retry: RetryPolicy::default() })
    }

    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    pub fn layout(&self) -> &UuidDbLayout {
        &self.layout
    }

    /// Write (or overwrite) the record for `uuid`, returning its path.
    ///
    /// Creating or truncating the file is retried while it fails with
    /// `WouldBlock`, up to the configured number of attempts.
    pub fn write_record(&self, uuid: &BinaryUuid, source: &str) -> DbResult<PathBuf> {
        let path = self.layout.record_path(uuid);
        let result = retry_on_would_block(&self.retry, || {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut file = File::create(&path)?;
            file.write_all(source.as_bytes())
        });
        match result {
            Ok(()) => {
                debug!(uuid = %uuid, path = %path.display(), "wrote uuid record");
                Ok(path)
            }
            Err(RetryError::Exhausted { attempts }) => Err(DbError::LockTimeout { path, attempts }),
            Err(RetryError::Io(source)) => Err(DbError::Io { path, source }),
        }
    }

    /// Read the relative binary path recorded for `uuid`, if any.
    pub fn read_record(&self, uuid: &BinaryUuid) -> DbResult<Option<String>> {
        let path = self.layout.record_path(uuid);
        match fs::read_to_string(&path) {
            Ok(body) => Ok(Some(body.trim().to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(DbError::Io { path, source }),
        }
    }

    /// Parse `raw` as a UUID and look up its record.
    pub fn lookup(&self, raw: &str) -> DbResult<Option<String>> {
        let uuid = BinaryUuid::parse(raw.trim())?;
        self.read_record(&uuid)
    }
}
