//! Binary cache populator.
//!
//! Copies every Mach-O binary from the configured system directories into a
//! per-OS-build directory on the cache share, mirroring absolute paths, and
//! unpacks the platform shared library caches next to them.

use std::env;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::BinaryCacheConfig;
use crate::macho;
use crate::model::{MachOKind, OsVersion};
use crate::services::mount::{ensure_share_mounted, MountError};
use crate::services::walk::walk_files;
use crate::tools::parse::parse_os_version;
use crate::tools::{HostTools, ToolError};

/// Shared cache files that get extracted.
pub const DYLD_CACHE_PREFIX: &str = "dyld_shared_cache";
/// Rosetta AOT caches; expected in the shared cache directory but not extracted.
pub const AOT_CACHE_PREFIX: &str = "aot_shared_cache";
/// Symbol map files that accompany each shared cache.
pub const MAP_SUFFIX: &str = ".map";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Mount(#[from] MountError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Unrecognized sw_vers output: {0:?}")]
    UnrecognizedOsVersion(String),

    /// This OS build was already cached.
    #[error("Cache directory already exists: {0}")]
    RunDirExists(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CacheError + '_ {
    move |source| CacheError::Io { path: path.to_path_buf(), source }
}

/// A binary copied into the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopiedBinary {
    pub source: PathBuf,
    pub target: PathBuf,
    pub kind: MachOKind,
}

/// Summary of one populator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheReport {
    pub os_version: OsVersion,
    pub run_dir: PathBuf,
    /// Whether the share had to be mounted by this run.
    pub mounted: bool,
    pub started_at: String,
    pub finished_at: String,
    pub copied: Vec<CopiedBinary>,
    /// Target directories of extracted shared caches.
    pub extracted_caches: Vec<PathBuf>,
    /// Shared cache directory entries with an unrecognized name prefix.
    pub unexpected_shared_cache_entries: Vec<String>,
    pub missing_search_dirs: Vec<PathBuf>,
}

/// Outcome of scanning the shared cache directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedCacheOutcome {
    pub extracted: Vec<PathBuf>,
    pub unexpected: Vec<String>,
}

/// Drives one populator run against a config and a set of host tools.
pub struct BinaryCachePopulator<'a> {
    pub config: &'a BinaryCacheConfig,
    pub tools: &'a dyn HostTools,
}

impl<'a> BinaryCachePopulator<'a> {
    pub fn new(config: &'a BinaryCacheConfig, tools: &'a dyn HostTools) -> Self {
        Self { config, tools }
    }

    pub fn run(&self) -> Result<CacheReport, CacheError> {
        let started_at = Utc::now().to_rfc3339();
        let symbol_dir = self.config.symbol_dir();
        let mounted = ensure_share_mounted(&symbol_dir, &self.config.share, self.tools)?;

        let os_version = self.os_version()?;
        let run_dir = symbol_dir.join(os_version.dir_name());
        create_run_dir(&run_dir)?;
        info!(os = %os_version, run_dir = %run_dir.display(), "populating binary cache");

        let mut copied = Vec::new();
        let mut missing_search_dirs = Vec::new();
        for search_dir in &self.config.search_dirs {
            if !search_dir.is_dir() {
                warn!(dir = %search_dir.display(), "search directory missing, skipping");
                missing_search_dirs.push(search_dir.clone());
                continue;
            }
            copied.extend(self.copy_binaries(search_dir, &run_dir)?);
        }

        let shared = self.extract_shared_caches(&run_dir)?;

        Ok(CacheReport {
            os_version,
            run_dir,
            mounted,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            copied,
            extracted_caches: shared.extracted,
            unexpected_shared_cache_entries: shared.unexpected,
            missing_search_dirs,
        })
    }

    /// Query and parse the local OS version.
    pub fn os_version(&self) -> Result<OsVersion, CacheError> {
        let report = self.tools.os_version_report()?;
        parse_os_version(&report).ok_or(CacheError::UnrecognizedOsVersion(report))
    }

    /// Copy every Mach-O file below `search_dir` to its mirrored path below
    /// `run_dir`.
    pub fn copy_binaries(
        &self,
        search_dir: &Path,
        run_dir: &Path,
    ) -> Result<Vec<CopiedBinary>, CacheError> {
        let search_dir = absolute(search_dir)?;
        let mut copied = Vec::new();
        for source in walk_files(&search_dir, None) {
            let Some(kind) = macho::classify_file(&source).map_err(io_err(&source))? else {
                continue;
            };
            info!("{}", source.display());
            let target = mirrored_path(run_dir, &source);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(io_err(parent))?;
            }
            fs::copy(&source, &target).map_err(io_err(&target))?;
            copied.push(CopiedBinary { source, target, kind });
        }
        Ok(copied)
    }

    /// Extract every `dyld_shared_cache*` file (map files excepted) from the
    /// configured shared cache directory into its mirror below `run_dir`.
    ///
    /// Entries whose names match neither known prefix are reported in the
    /// outcome and otherwise ignored. A missing shared cache directory yields
    /// an empty outcome.
    pub fn extract_shared_caches(&self, run_dir: &Path) -> Result<SharedCacheOutcome, CacheError> {
        let mut outcome = SharedCacheOutcome::default();
        let cache_dir = absolute(&self.config.shared_cache_dir)?;
        if !cache_dir.is_dir() {
            return Ok(outcome);
        }

        let target_root = mirrored_path(run_dir, &cache_dir);
        fs::create_dir_all(&target_root).map_err(io_err(&target_root))?;

        let mut entries = fs::read_dir(&cache_dir)
            .map_err(io_err(&cache_dir))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err(&cache_dir))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.starts_with(DYLD_CACHE_PREFIX) && !name.starts_with(AOT_CACHE_PREFIX) {
                warn!(entry = %name, "unexpected entry in shared cache directory");
                outcome.unexpected.push(name);
                continue;
            }
            let path = entry.path();
            let extractable = name.starts_with(DYLD_CACHE_PREFIX)
                && !name.ends_with(MAP_SUFFIX)
                && path.is_file();
            if !extractable {
                continue;
            }

            info!("{}", path.display());
            let target = target_root.join(&name);
            fs::create_dir(&target).map_err(io_err(&target))?;
            self.tools.extract_shared_cache(&path, &target)?;
            outcome.extracted.push(target);
        }
        Ok(outcome)
    }
}

fn create_run_dir(run_dir: &Path) -> Result<(), CacheError> {
    match fs::create_dir(run_dir) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            Err(CacheError::RunDirExists(run_dir.to_path_buf()))
        }
        Err(source) => Err(CacheError::Io { path: run_dir.to_path_buf(), source }),
    }
}

fn absolute(path: &Path) -> Result<PathBuf, CacheError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir().map_err(io_err(path))?;
    Ok(cwd.join(path))
}

/// `base` joined with `absolute` minus its root, so `/usr/lib/libz.dylib`
/// lands at `<base>/usr/lib/libz.dylib`.
pub fn mirrored_path(base: &Path, absolute: &Path) -> PathBuf {
    let mut out = base.to_path_buf();
    out.extend(
        absolute.components().filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_))),
    );
    out
}
