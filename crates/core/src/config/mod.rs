//! Explicit configuration for the cache populator and UUID database builder.
//!
//! Every field has a default matching the conventional setup, so an empty
//! config file (or none at all) yields a usable [`Settings`]. Paths may start
//! with `~`, which is expanded against `$HOME` by [`expand_home`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse config YAML at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Top-level settings shared by the CLI frontends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tools: ToolPaths,
    pub binary_cache: BinaryCacheConfig,
    pub uuid_db: UuidDbConfig,
}

impl Settings {
    /// Load settings from a JSON or YAML (`.yaml`/`.yml`) file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        if matches!(ext, "yaml" | "yml") {
            serde_yaml::from_str(&body)
                .map_err(|source| ConfigError::Yaml { path: path.to_path_buf(), source })
        } else {
            serde_json::from_str(&body)
                .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })
        }
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// Remote share and the local mount point it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// SMB URL passed to `mount -t smbfs`.
    pub server: String,
    pub mount_point: PathBuf,
}

/// Settings for `copy-system-binaries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryCacheConfig {
    pub share: ShareConfig,
    /// Folder below the mount point that holds one directory per OS build.
    pub subfolder: String,
    /// Directories scanned for Mach-O binaries.
    pub search_dirs: Vec<PathBuf>,
    /// Location of the platform shared library caches.
    pub shared_cache_dir: PathBuf,
}

impl Default for BinaryCacheConfig {
    fn default() -> Self {
        Self {
            share: ShareConfig {
                server: "smb://server/path".to_string(),
                mount_point: PathBuf::from("path_to_mount"),
            },
            subfolder: "macOS Binaries".to_string(),
            search_dirs: vec![
                PathBuf::from("/System/Library/Frameworks"),
                PathBuf::from("/System/Library/PrivateFrameworks"),
                PathBuf::from("/usr/lib"),
            ],
            shared_cache_dir: PathBuf::from("/System/Library/dyld"),
        }
    }
}

impl BinaryCacheConfig {
    /// `<mount_point>/<subfolder>`, with `~` expanded.
    pub fn symbol_dir(&self) -> PathBuf {
        expand_home(&self.share.mount_point).join(&self.subfolder)
    }
}

/// Settings for `rebuild-uuid-database` and `lookup-uuid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UuidDbConfig {
    pub share: ShareConfig,
    /// Manifest file name at the root of the mounted share.
    pub manifest_name: String,
    /// Directory that manifest entries are relative to. Records store paths
    /// relative to this root.
    pub source_root: PathBuf,
    /// Directories with this suffix are not descended (debug-symbol bundles).
    pub bundle_suffix: String,
    /// Architecture skipped when recording slices of fat binaries.
    pub excluded_arch: String,
    pub write_retry: RetryPolicy,
}

impl Default for UuidDbConfig {
    fn default() -> Self {
        Self {
            share: ShareConfig {
                server: "smb://yourserver/symbolcache".to_string(),
                mount_point: PathBuf::from("path_to_symbolcache"),
            },
            manifest_name: "uuidsources.txt".to_string(),
            source_root: PathBuf::from("~/mnt"),
            bundle_suffix: ".dSYM".to_string(),
            excluded_arch: "i386".to_string(),
            write_retry: RetryPolicy::default(),
        }
    }
}

impl UuidDbConfig {
    pub fn manifest_path(&self) -> PathBuf {
        expand_home(&self.share.mount_point).join(&self.manifest_name)
    }

    pub fn source_root(&self) -> PathBuf {
        expand_home(&self.source_root)
    }
}

/// Bounded retry for transient lock conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 30, delay_ms: 1000 }
    }
}

impl RetryPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Executables for the external platform tools.
///
/// Defaults come from `SYMCACHE_*` environment variables when set, otherwise
/// the bare tool names are resolved through `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub mount: PathBuf,
    pub sw_vers: PathBuf,
    pub objdump: PathBuf,
    pub dyld_shared_cache_util: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            mount: tool_from_env("SYMCACHE_MOUNT", "mount"),
            sw_vers: tool_from_env("SYMCACHE_SW_VERS", "sw_vers"),
            objdump: tool_from_env("SYMCACHE_OBJDUMP", "objdump"),
            dyld_shared_cache_util: tool_from_env(
                "SYMCACHE_DYLD_SHARED_CACHE_UTIL",
                "dyld_shared_cache_util",
            ),
        }
    }
}

fn tool_from_env(var: &str, fallback: &str) -> PathBuf {
    env::var_os(var).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(fallback))
}

/// Expand a leading `~` against `$HOME`. Other paths are returned unchanged,
/// as is `~` itself when `$HOME` is unset.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}
