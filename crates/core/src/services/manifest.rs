//! Source manifest: one source folder per line, `#` starts a comment line.

use std::fs;
use std::io;
use std::path::Path;

/// Marker for lines that are ignored.
pub const COMMENT_MARKER: char = '#';

/// Trim every line and keep the non-blank, non-comment ones.
pub fn parse_manifest(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .map(str::to_string)
        .collect()
}

pub fn read_manifest(path: &Path) -> io::Result<Vec<String>> {
    Ok(parse_manifest(&fs::read_to_string(path)?))
}
