use std::path::PathBuf;

use symcache::commands::{load_settings, lookup_uuid_command};
use symcache::resolve_dir;
use tempfile::tempdir;

#[test]
fn resolve_dir_keeps_absolute_paths() {
    assert_eq!(resolve_dir("/var/db/uuids").unwrap(), PathBuf::from("/var/db/uuids"));
}

#[test]
fn resolve_dir_joins_relative_paths_onto_cwd() {
    let cwd = std::env::current_dir().expect("cwd");
    assert_eq!(resolve_dir("uuid-db").unwrap(), cwd.join("uuid-db"));
}

#[test]
fn resolve_dir_expands_home() {
    let Some(home) = std::env::var_os("HOME") else { return };
    assert_eq!(resolve_dir("~/uuid-db").unwrap(), PathBuf::from(home).join("uuid-db"));
}

#[test]
fn load_settings_defaults_without_config() {
    let settings = load_settings(None).unwrap();
    assert_eq!(settings.uuid_db.manifest_name, "uuidsources.txt");
}

#[test]
fn lookup_errors_when_database_missing() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("nope");
    let err = lookup_uuid_command(
        missing.to_str().unwrap(),
        "C4CBD2CF-39D5-3185-851E-85C7DD2F8C7F",
        None,
        false,
    )
    .unwrap_err();
    assert!(err.to_string().contains("UUID database not found"), "unexpected error: {err}");
}

#[test]
fn lookup_errors_on_malformed_uuid() {
    let temp = tempdir().unwrap();
    let err = lookup_uuid_command(temp.path().to_str().unwrap(), "xyz", None, false).unwrap_err();
    assert!(err.to_string().contains("Failed to look up xyz"), "unexpected error: {err}");
}
