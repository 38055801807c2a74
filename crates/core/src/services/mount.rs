use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::{expand_home, ShareConfig};
use crate::tools::{HostTools, ToolError};

#[derive(Debug, Error)]
pub enum MountError {
    #[error("Failed to create mount point {path}: {source}")]
    MountPoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to mount {server}: {source}")]
    Mount {
        server: String,
        #[source]
        source: ToolError,
    },
}

/// Mount `share` unless `probe` (a path that only exists on the mounted share)
/// is already present. Returns whether a mount was performed.
pub fn ensure_share_mounted(
    probe: &Path,
    share: &ShareConfig,
    tools: &dyn HostTools,
) -> Result<bool, MountError> {
    if probe.exists() {
        return Ok(false);
    }

    let mount_point = expand_home(&share.mount_point);
    fs::create_dir_all(&mount_point)
        .map_err(|source| MountError::MountPoint { path: mount_point.clone(), source })?;
    info!(server = %share.server, mount_point = %mount_point.display(), "mounting share");
    tools
        .mount_share(&share.server, &mount_point)
        .map_err(|source| MountError::Mount { server: share.server.clone(), source })?;
    Ok(true)
}
