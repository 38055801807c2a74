//! Core data model: binary kinds, OS version identifiers, and binary UUIDs.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of Mach-O file recognized from its leading magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachOKind {
    /// Plain 64-bit Mach-O image.
    Thin64,
    /// Fat/universal container holding one image per architecture.
    Fat,
}

impl MachOKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachOKind::Thin64 => "thin64",
            MachOKind::Fat => "fat",
        }
    }
}

/// OS product version plus build code, e.g. `14.2.1` / `23C71`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsVersion {
    pub version: String,
    pub build: String,
}

impl OsVersion {
    pub fn new(version: impl Into<String>, build: impl Into<String>) -> Self {
        Self { version: version.into(), build: build.into() }
    }

    /// Name of the cache run directory for this OS build (`<version>_<build>`).
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.version, self.build)
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.build)
    }
}

/// Group lengths of a canonical hyphenated UUID.
const UUID_GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// A binary UUID in canonical `8-4-4-4-12` uppercase hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BinaryUuid(String);

/// Returned when a string is not a canonical hyphenated UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid UUID '{0}': expected 8-4-4-4-12 hex digits")]
pub struct InvalidUuid(pub String);

impl BinaryUuid {
    /// Parse a hyphenated UUID. Hex digits of either case are accepted and
    /// normalized to uppercase.
    pub fn parse(raw: &str) -> Result<Self, InvalidUuid> {
        let groups: Vec<&str> = raw.split('-').collect();
        let well_formed = groups.len() == UUID_GROUPS.len()
            && groups
                .iter()
                .zip(UUID_GROUPS)
                .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(InvalidUuid(raw.to_string()));
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into the six path segments used by the database layout: the first
    /// four hex digits, then every hyphen-delimited group of the remainder.
    ///
    /// `C4CBD2CF-39D5-3185-851E-85C7DD2F8C7F` becomes
    /// `["C4CB", "D2CF", "39D5", "3185", "851E", "85C7DD2F8C7F"]`.
    pub fn path_segments(&self) -> Vec<&str> {
        let (head, rest) = self.0.split_at(4);
        std::iter::once(head).chain(rest.split('-')).collect()
    }

    /// Relative path built from [`BinaryUuid::path_segments`].
    pub fn relative_path(&self) -> PathBuf {
        self.path_segments().into_iter().collect()
    }
}

impl fmt::Display for BinaryUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for BinaryUuid {
    type Error = InvalidUuid;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BinaryUuid::parse(&value)
    }
}

impl From<BinaryUuid> for String {
    fn from(value: BinaryUuid) -> Self {
        value.0
    }
}

impl std::str::FromStr for BinaryUuid {
    type Err = InvalidUuid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BinaryUuid::parse(s)
    }
}
