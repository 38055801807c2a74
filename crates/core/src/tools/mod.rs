//! External platform tools.
//!
//! Everything the services need from the host (mounting shares, querying the
//! OS version, inspecting Mach-O headers, unpacking shared caches) goes
//! through [`HostTools`]. [`SystemTools`] shells out to the real executables;
//! tests substitute canned output.

pub mod parse;

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::config::ToolPaths;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed { tool: String, status: String, stderr: String },
}

/// Host capabilities used by the cache populator and UUID database builder.
///
/// Query methods return the tool's raw stdout; interpretation lives in
/// [`parse`].
pub trait HostTools {
    /// Attach an SMB share at `mount_point` (`mount -t smbfs`).
    fn mount_share(&self, server: &str, mount_point: &Path) -> Result<(), ToolError>;

    /// `sw_vers` output.
    fn os_version_report(&self) -> Result<String, ToolError>;

    /// `objdump --macho --private-headers`, optionally for one slice of a fat
    /// binary.
    fn private_headers(&self, binary: &Path, arch: Option<&str>) -> Result<String, ToolError>;

    /// `objdump --macho --universal-headers`.
    fn universal_headers(&self, binary: &Path) -> Result<String, ToolError>;

    /// Unpack a shared library cache file into `target_dir`.
    fn extract_shared_cache(&self, cache_file: &Path, target_dir: &Path)
        -> Result<(), ToolError>;
}

/// [`HostTools`] backed by subprocesses.
#[derive(Debug, Clone, Default)]
pub struct SystemTools {
    pub paths: ToolPaths,
}

impl SystemTools {
    pub fn new(paths: ToolPaths) -> Self {
        Self { paths }
    }
}

impl HostTools for SystemTools {
    fn mount_share(&self, server: &str, mount_point: &Path) -> Result<(), ToolError> {
        run_tool(
            &self.paths.mount,
            [OsStr::new("-t"), OsStr::new("smbfs"), OsStr::new(server), mount_point.as_os_str()],
        )
        .map(|_| ())
    }

    fn os_version_report(&self) -> Result<String, ToolError> {
        run_tool(&self.paths.sw_vers, std::iter::empty::<&OsStr>())
    }

    fn private_headers(&self, binary: &Path, arch: Option<&str>) -> Result<String, ToolError> {
        let mut args: Vec<&OsStr> = vec![OsStr::new("--macho"), OsStr::new("--private-headers")];
        let arch_arg = arch.map(|a| format!("--arch={a}"));
        if let Some(a) = &arch_arg {
            args.push(OsStr::new(a));
        }
        args.push(binary.as_os_str());
        run_tool(&self.paths.objdump, args)
    }

    fn universal_headers(&self, binary: &Path) -> Result<String, ToolError> {
        run_tool(
            &self.paths.objdump,
            [OsStr::new("--macho"), OsStr::new("--universal-headers"), binary.as_os_str()],
        )
    }

    fn extract_shared_cache(
        &self,
        cache_file: &Path,
        target_dir: &Path,
    ) -> Result<(), ToolError> {
        run_tool(
            &self.paths.dyld_shared_cache_util,
            [OsStr::new("-extract"), target_dir.as_os_str(), cache_file.as_os_str()],
        )
        .map(|_| ())
    }
}

/// Run `program` with `args`, returning stdout on success.
fn run_tool<I, S>(program: &Path, args: I) -> Result<String, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let tool = program.display().to_string();
    let mut command = Command::new(program);
    command.args(args);
    debug!(?command, "running tool");
    let output =
        command.output().map_err(|source| ToolError::Spawn { tool: tool.clone(), source })?;
    if !output.status.success() {
        return Err(ToolError::Failed {
            tool,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn run_tool_reports_spawn_failure() {
        let err = run_tool(Path::new("/nonexistent/symcache-tool"), ["x"]).unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }), "unexpected error: {err}");
    }

    #[test]
    fn run_tool_reports_non_zero_exit() {
        let err = run_tool(Path::new("sh"), ["-c", "echo boom >&2; exit 3"]).unwrap_err();
        match err {
            ToolError::Failed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("expected Failed, got {other}"),
        }
    }

    #[test]
    fn run_tool_returns_stdout() {
        let out = run_tool(Path::new("sh"), ["-c", "printf 'hello'"]).unwrap();
        assert_eq!(out, "hello");
    }
}
