//! Parsers for the textual output of `sw_vers` and `objdump --macho`.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::model::{BinaryUuid, OsVersion};

fn os_version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^ProductVersion:\s+([0-9.]+)\nBuildVersion:\s+([A-Za-z0-9]+)")
            .expect("os version pattern compiles")
    })
}

fn uuid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]+uuid[ \t]+([0-9A-Z-]+)$").expect("uuid pattern compiles")
    })
}

fn architecture_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*architecture\s+(.+)").expect("architecture pattern compiles")
    })
}

/// Extract version and build from `sw_vers` output. `ProductVersion` must be
/// directly followed by `BuildVersion`.
pub fn parse_os_version(output: &str) -> Option<OsVersion> {
    let caps = os_version_re().captures(output)?;
    Some(OsVersion::new(&caps[1], &caps[2]))
}

/// First `uuid` line of `objdump --macho --private-headers` output.
///
/// Returns `None` when there is no such line or its value is not a canonical
/// UUID.
pub fn parse_uuid(output: &str) -> Option<BinaryUuid> {
    let caps = uuid_re().captures(output)?;
    BinaryUuid::parse(&caps[1]).ok()
}

/// Architecture names listed by `objdump --macho --universal-headers`, in
/// output order.
pub fn parse_architectures(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| architecture_re().captures(line))
        .map(|caps| caps[1].trim().to_string())
        .filter(|arch| !arch.is_empty())
        .collect()
}
