//! Mach-O detection by leading magic bytes.
//!
//! Only two signatures are recognized: the 64-bit Mach-O header as it appears
//! on disk for little-endian images, and the fat/universal header. Nothing
//! past the first four bytes is inspected.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::model::MachOKind;

/// `MH_MAGIC_64` as stored on disk by little-endian targets.
pub const MAGIC_MACH64: [u8; 4] = [0xcf, 0xfa, 0xed, 0xfe];
/// `FAT_MAGIC`, always big-endian on disk.
pub const MAGIC_FAT: [u8; 4] = [0xca, 0xfe, 0xba, 0xbe];

/// Classify a 4-byte prefix.
pub fn classify_magic(prefix: &[u8]) -> Option<MachOKind> {
    if prefix == MAGIC_MACH64 {
        Some(MachOKind::Thin64)
    } else if prefix == MAGIC_FAT {
        Some(MachOKind::Fat)
    } else {
        None
    }
}

/// Read up to the first four bytes of a file. Shorter files yield fewer bytes.
pub fn read_magic(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buf = Vec::with_capacity(4);
    file.by_ref().take(4).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read and classify a file in one step.
pub fn classify_file(path: &Path) -> io::Result<Option<MachOKind>> {
    Ok(classify_magic(&read_magic(path)?))
}
