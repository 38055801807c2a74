//! UUID database builder.
//!
//! Walks the source folders listed in the manifest on the symbol share and
//! records, for every Mach-O image found, which binary carries its UUID.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::UuidDbConfig;
use crate::db::{DbError, UuidDb, UuidRecord};
use crate::macho;
use crate::model::MachOKind;
use crate::retry::{retry_on_would_block, RetryError};
use crate::services::manifest::read_manifest;
use crate::services::mount::{ensure_share_mounted, MountError};
use crate::services::walk::walk_files;
use crate::tools::parse::{parse_architectures, parse_uuid};
use crate::tools::{HostTools, ToolError};

#[derive(Debug, Error)]
pub enum UuidDbError {
    #[error(transparent)]
    Mount(#[from] MountError),

    #[error("Failed to read manifest {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {attempts} attempts waiting for lock on {path}")]
    Busy { path: PathBuf, attempts: u32 },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// A Mach-O image for which the inspector reported no UUID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingUuid {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

/// Summary of one builder run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UuidDbReport {
    pub db_root: PathBuf,
    pub manifest: PathBuf,
    /// Whether the share had to be mounted by this run.
    pub mounted: bool,
    pub started_at: String,
    pub finished_at: String,
    /// Source folders from the manifest, in order.
    pub sources: Vec<String>,
    pub missing_sources: Vec<PathBuf>,
    /// Number of Mach-O files inspected.
    pub binaries_scanned: usize,
    pub records: Vec<UuidRecord>,
    pub missing_uuid: Vec<MissingUuid>,
}

/// Drives one builder run.
pub struct UuidDbBuilder<'a> {
    pub config: &'a UuidDbConfig,
    pub tools: &'a dyn HostTools,
    pub db: &'a UuidDb,
}

impl<'a> UuidDbBuilder<'a> {
    pub fn new(config: &'a UuidDbConfig, tools: &'a dyn HostTools, db: &'a UuidDb) -> Self {
        Self { config, tools, db }
    }

    /// Mount the share if needed, read the manifest, and index every source
    /// folder it lists.
    pub fn run(&self) -> Result<UuidDbReport, UuidDbError> {
        let started_at = Utc::now().to_rfc3339();
        let manifest = self.config.manifest_path();
        let mounted = ensure_share_mounted(&manifest, &self.config.share, self.tools)?;
        let sources = read_manifest(&manifest)
            .map_err(|source| UuidDbError::Manifest { path: manifest.clone(), source })?;

        let mut report = UuidDbReport {
            db_root: self.db.root().to_path_buf(),
            manifest,
            mounted,
            started_at,
            ..UuidDbReport::default()
        };
        for source in &sources {
            self.index_source(source, &mut report)?;
        }
        report.sources = sources;
        report.finished_at = Utc::now().to_rfc3339();
        Ok(report)
    }

    /// Index one manifest entry, relative to the source root.
    pub fn index_source(
        &self,
        source: &str,
        report: &mut UuidDbReport,
    ) -> Result<(), UuidDbError> {
        let source_root = self.config.source_root();
        let dir = source_root.join(source);
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "source folder missing, skipping");
            report.missing_sources.push(dir);
            return Ok(());
        }

        for path in walk_files(&dir, Some(self.config.bundle_suffix.as_str())) {
            let Some(kind) = self.classify(&path)? else {
                continue;
            };
            report.binaries_scanned += 1;
            let relative = relative_source(&path, &source_root);
            match kind {
                MachOKind::Thin64 => self.index_image(&path, &relative, None, report)?,
                MachOKind::Fat => {
                    let listing = self.tools.universal_headers(&path)?;
                    for arch in parse_architectures(&listing) {
                        if arch == self.config.excluded_arch {
                            continue;
                        }
                        self.index_image(&path, &relative, Some(arch), report)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Record the UUID of `path` (or one slice of it) in the database.
    fn index_image(
        &self,
        path: &Path,
        relative: &str,
        arch: Option<String>,
        report: &mut UuidDbReport,
    ) -> Result<(), UuidDbError> {
        let headers = self.tools.private_headers(path, arch.as_deref())?;
        let Some(uuid) = parse_uuid(&headers) else {
            warn!(
                path = %path.display(),
                arch = arch.as_deref().unwrap_or(""),
                "[FAILED] No uuid found"
            );
            report.missing_uuid.push(MissingUuid { path: path.to_path_buf(), arch });
            return Ok(());
        };

        info!("{} {}", path.display(), arch.as_deref().unwrap_or(""));
        let record_path = self.db.write_record(&uuid, relative)?;
        report.records.push(UuidRecord { uuid, arch, source: relative.to_string(), record_path });
        Ok(())
    }

    fn classify(&self, path: &Path) -> Result<Option<MachOKind>, UuidDbError> {
        match retry_on_would_block(&self.config.write_retry, || macho::read_magic(path)) {
            Ok(prefix) => Ok(macho::classify_magic(&prefix)),
            Err(RetryError::Exhausted { attempts }) => {
                Err(UuidDbError::Busy { path: path.to_path_buf(), attempts })
            }
            Err(RetryError::Io(source)) => {
                Err(UuidDbError::Read { path: path.to_path_buf(), source })
            }
        }
    }
}

/// Path stored in a record: relative to the source root when below it.
fn relative_source(path: &Path, source_root: &Path) -> String {
    path.strip_prefix(source_root).unwrap_or(path).to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_source_strips_root_when_possible() {
        let root = Path::new("/Users/build/mnt");
        assert_eq!(
            relative_source(Path::new("/Users/build/mnt/releases/1.0/App"), root),
            "releases/1.0/App"
        );
        assert_eq!(relative_source(Path::new("/elsewhere/App"), root), "/elsewhere/App");
    }
}
