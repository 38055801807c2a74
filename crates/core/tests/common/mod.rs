//! Shared fixtures: a scripted `HostTools` and Mach-O stand-in files.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use symcache_core::macho::{MAGIC_FAT, MAGIC_MACH64};
use symcache_core::tools::{HostTools, ToolError};

pub const SW_VERS: &str = "ProductName:\tmacOS\nProductVersion:\t14.2.1\nBuildVersion:\t23C71\n";

/// `HostTools` with canned output. Every call is logged in `calls`.
#[derive(Default)]
pub struct FakeTools {
    pub sw_vers: String,
    /// Keyed by binary path and requested architecture.
    pub private_headers: HashMap<(PathBuf, Option<String>), String>,
    pub universal_headers: HashMap<PathBuf, String>,
    /// Files (relative to the mount point) that appear once the share is mounted.
    pub share_files: Vec<(PathBuf, String)>,
    pub fail_extract: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FakeTools {
    pub fn new() -> Self {
        Self { sw_vers: SW_VERS.to_string(), ..Self::default() }
    }

    pub fn with_uuid(mut self, binary: &Path, arch: Option<&str>, uuid: &str) -> Self {
        self.private_headers.insert(
            (binary.to_path_buf(), arch.map(str::to_string)),
            format!("Load command 9\n     cmd LC_UUID\n cmdsize 24\n    uuid {uuid}\n"),
        );
        self
    }

    pub fn with_architectures(mut self, binary: &Path, archs: &[&str]) -> Self {
        let mut listing = format!("Fat headers\nfat_magic FAT_MAGIC\nnfat_arch {}\n", archs.len());
        for arch in archs {
            listing.push_str(&format!("architecture {arch}\n    cputype CPU_TYPE_ANY\n"));
        }
        self.universal_headers.insert(binary.to_path_buf(), listing);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl HostTools for FakeTools {
    fn mount_share(&self, server: &str, mount_point: &Path) -> Result<(), ToolError> {
        self.log(format!("mount {server} {}", mount_point.display()));
        for (rel, body) in &self.share_files {
            let path = mount_point.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        Ok(())
    }

    fn os_version_report(&self) -> Result<String, ToolError> {
        self.log("sw_vers".to_string());
        Ok(self.sw_vers.clone())
    }

    fn private_headers(&self, binary: &Path, arch: Option<&str>) -> Result<String, ToolError> {
        self.log(format!("private-headers {} {}", binary.display(), arch.unwrap_or("-")));
        Ok(self
            .private_headers
            .get(&(binary.to_path_buf(), arch.map(str::to_string)))
            .cloned()
            .unwrap_or_else(|| "Mach header\n     cmd LC_SEGMENT_64\n".to_string()))
    }

    fn universal_headers(&self, binary: &Path) -> Result<String, ToolError> {
        self.log(format!("universal-headers {}", binary.display()));
        self.universal_headers.get(binary).cloned().ok_or_else(|| ToolError::Failed {
            tool: "objdump".into(),
            status: "exit status: 1".into(),
            stderr: format!("{}: not a universal file", binary.display()),
        })
    }

    fn extract_shared_cache(
        &self,
        cache_file: &Path,
        target_dir: &Path,
    ) -> Result<(), ToolError> {
        self.log(format!("extract {} {}", cache_file.display(), target_dir.display()));
        if self.fail_extract {
            return Err(ToolError::Failed {
                tool: "dyld_shared_cache_util".into(),
                status: "exit status: 1".into(),
                stderr: "bad cache".into(),
            });
        }
        fs::write(target_dir.join("extracted"), b"ok").unwrap();
        Ok(())
    }
}

fn write_with_magic(path: &Path, magic: &[u8; 4]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut body = magic.to_vec();
    body.extend_from_slice(&[0u8; 28]);
    fs::write(path, body).unwrap();
}

pub fn write_thin(path: &Path) {
    write_with_magic(path, &MAGIC_MACH64);
}

pub fn write_fat(path: &Path) {
    write_with_magic(path, &MAGIC_FAT);
}

pub fn write_plain(path: &Path, body: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}
