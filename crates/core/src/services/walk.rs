use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Regular files below `root`, in file-name order.
///
/// Symlinks are never followed nor yielded. Directories below `root` whose
/// name ends with `prune_suffix` are not descended. Entries that cannot be
/// read are logged and skipped.
pub fn walk_files<'a>(
    root: &'a Path,
    prune_suffix: Option<&'a str>,
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_entry(move |entry| !is_pruned(entry, prune_suffix))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| {
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                debug!(path = %entry.path().display(), "skipping symlink");
            }
            file_type.is_file()
        })
        .map(DirEntry::into_path)
}

fn is_pruned(entry: &DirEntry, prune_suffix: Option<&str>) -> bool {
    let Some(suffix) = prune_suffix else {
        return false;
    };
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_str().is_some_and(|name| name.ends_with(suffix))
}
