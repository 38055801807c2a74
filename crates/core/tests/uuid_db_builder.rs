mod common;

use std::fs;
use std::path::{Path, PathBuf};

use common::{write_fat, write_plain, write_thin, FakeTools};
use symcache_core::config::{RetryPolicy, ShareConfig, UuidDbConfig};
use symcache_core::db::UuidDb;
use symcache_core::services::{UuidDbBuilder, UuidDbError};
use tempfile::{tempdir, TempDir};

const APP_UUID: &str = "C4CBD2CF-39D5-3185-851E-85C7DD2F8C7F";
const LIB_X86_UUID: &str = "11111111-2222-3333-4444-555555555555";
const LIB_ARM_UUID: &str = "AAAAAAAA-BBBB-CCCC-DDDD-EEEEEEEEEEEE";
const LIB_I386_UUID: &str = "99999999-8888-7777-6666-555555555555";

struct Fixture {
    _tmp: TempDir,
    config: UuidDbConfig,
    db_root: PathBuf,
}

impl Fixture {
    /// Share already mounted, manifest in place, empty source root.
    fn new(manifest: &str) -> Self {
        let tmp = tempdir().unwrap();
        let share = tmp.path().join("share");
        fs::create_dir_all(&share).unwrap();
        fs::write(share.join("uuidsources.txt"), manifest).unwrap();
        let config = UuidDbConfig {
            share: ShareConfig { server: "smb://test/symbolcache".into(), mount_point: share },
            source_root: tmp.path().join("mnt"),
            write_retry: RetryPolicy { max_attempts: 2, delay_ms: 0 },
            ..UuidDbConfig::default()
        };
        let db_root = tmp.path().join("db");
        Self { _tmp: tmp, config, db_root }
    }

    fn source(&self, rel: &str) -> PathBuf {
        self.config.source_root.join(rel)
    }

    fn db(&self) -> UuidDb {
        UuidDb::create(&self.db_root, self.config.write_retry).unwrap()
    }
}

fn record(db_root: &Path, uuid: &str) -> Option<String> {
    let db = UuidDb::open(db_root).unwrap();
    db.lookup(uuid).unwrap()
}

#[test]
fn indexes_thin_and_fat_binaries() {
    let fx = Fixture::new("# sources\nreleases/1.0\n");
    let app = fx.source("releases/1.0/App.app/Contents/MacOS/App");
    let lib = fx.source("releases/1.0/libUniversal.dylib");
    write_thin(&app);
    write_fat(&lib);
    write_plain(&fx.source("releases/1.0/README.txt"), b"not a binary");

    let tools = FakeTools::new()
        .with_uuid(&app, None, APP_UUID)
        .with_architectures(&lib, &["x86_64", "i386", "arm64"])
        .with_uuid(&lib, Some("x86_64"), LIB_X86_UUID)
        .with_uuid(&lib, Some("arm64"), LIB_ARM_UUID)
        .with_uuid(&lib, Some("i386"), LIB_I386_UUID);

    let db = fx.db();
    let report = UuidDbBuilder::new(&fx.config, &tools, &db).run().expect("run builder");

    assert!(!report.mounted);
    assert_eq!(report.sources, vec!["releases/1.0"]);
    assert_eq!(report.binaries_scanned, 2);
    assert_eq!(report.records.len(), 3);
    assert!(report.missing_uuid.is_empty());

    assert_eq!(
        fs::read_to_string(fx.db_root.join("C4CB/D2CF/39D5/3185/851E/85C7DD2F8C7F")).unwrap(),
        "releases/1.0/App.app/Contents/MacOS/App"
    );
    assert_eq!(
        record(&fx.db_root, LIB_X86_UUID).as_deref(),
        Some("releases/1.0/libUniversal.dylib")
    );
    assert_eq!(
        record(&fx.db_root, LIB_ARM_UUID).as_deref(),
        Some("releases/1.0/libUniversal.dylib")
    );
    // The legacy 32-bit slice is never inspected nor recorded.
    assert_eq!(record(&fx.db_root, LIB_I386_UUID), None);
    assert!(!tools.calls().iter().any(|c| c.ends_with(" i386")));
    // Non-Mach-O files never reach the inspector.
    assert!(!tools.calls().iter().any(|c| c.contains("README.txt")));
}

#[test]
fn skips_dsym_bundles() {
    let fx = Fixture::new("builds\n");
    let app = fx.source("builds/App");
    let dwarf = fx.source("builds/App.dSYM/Contents/Resources/DWARF/App");
    write_thin(&app);
    write_thin(&dwarf);
    let tools = FakeTools::new().with_uuid(&app, None, APP_UUID).with_uuid(&dwarf, None, APP_UUID);

    let db = fx.db();
    let report = UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap();

    assert_eq!(report.binaries_scanned, 1);
    assert_eq!(record(&fx.db_root, APP_UUID).as_deref(), Some("builds/App"));
    assert!(!tools.calls().iter().any(|c| c.contains(".dSYM")));
}

#[cfg(unix)]
#[test]
fn symlinked_binaries_are_not_scanned() {
    let fx = Fixture::new("builds\n");
    let app = fx.source("builds/App");
    write_thin(&app);
    std::os::unix::fs::symlink(&app, fx.source("builds/AppAlias")).unwrap();
    let tools = FakeTools::new().with_uuid(&app, None, APP_UUID);

    let db = fx.db();
    let report = UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap();

    assert_eq!(report.binaries_scanned, 1);
    assert_eq!(record(&fx.db_root, APP_UUID).as_deref(), Some("builds/App"));
    assert!(!tools.calls().iter().any(|c| c.contains("AppAlias")));
}

#[test]
fn rerun_overwrites_instead_of_duplicating() {
    let fx = Fixture::new("builds\n");
    let app = fx.source("builds/App");
    write_thin(&app);
    let tools = FakeTools::new().with_uuid(&app, None, APP_UUID);
    let db = fx.db();

    UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap();
    UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap();

    let leaf_dir = fx.db_root.join("C4CB/D2CF/39D5/3185/851E");
    let entries: Vec<_> = fs::read_dir(&leaf_dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(record(&fx.db_root, APP_UUID).as_deref(), Some("builds/App"));
}

#[test]
fn shared_uuid_keeps_last_binary_seen() {
    let fx = Fixture::new("a\nb\n");
    let first = fx.source("a/App");
    let second = fx.source("b/App");
    write_thin(&first);
    write_thin(&second);
    let tools =
        FakeTools::new().with_uuid(&first, None, APP_UUID).with_uuid(&second, None, APP_UUID);

    let db = fx.db();
    let report = UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap();

    assert_eq!(report.records.len(), 2);
    assert_eq!(record(&fx.db_root, APP_UUID).as_deref(), Some("b/App"));
}

#[test]
fn binary_without_uuid_is_reported_and_run_continues() {
    let fx = Fixture::new("builds\n");
    let stripped = fx.source("builds/a_stripped");
    let app = fx.source("builds/b_app");
    write_thin(&stripped);
    write_thin(&app);
    let tools = FakeTools::new().with_uuid(&app, None, APP_UUID);

    let db = fx.db();
    let report = UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap();

    assert_eq!(report.missing_uuid.len(), 1);
    assert_eq!(report.missing_uuid[0].path, stripped);
    assert_eq!(report.missing_uuid[0].arch, None);
    assert_eq!(record(&fx.db_root, APP_UUID).as_deref(), Some("builds/b_app"));
}

#[test]
fn fat_binary_without_architectures_records_nothing() {
    let fx = Fixture::new("builds\n");
    let lib = fx.source("builds/libEmpty.dylib");
    write_fat(&lib);
    let tools = FakeTools::new().with_architectures(&lib, &[]);

    let db = fx.db();
    let report = UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap();

    assert_eq!(report.binaries_scanned, 1);
    assert!(report.records.is_empty());
    assert!(report.missing_uuid.is_empty());
}

#[test]
fn mounts_share_when_manifest_is_missing() {
    let tmp = tempdir().unwrap();
    let mount_point = tmp.path().join("not-yet-mounted");
    let config = UuidDbConfig {
        share: ShareConfig { server: "smb://test/symbolcache".into(), mount_point: mount_point.clone() },
        source_root: tmp.path().join("mnt"),
        ..UuidDbConfig::default()
    };
    let app = config.source_root.join("builds/App");
    write_thin(&app);
    let mut tools = FakeTools::new().with_uuid(&app, None, APP_UUID);
    tools.share_files.push(("uuidsources.txt".into(), "builds\n".into()));

    let db = UuidDb::create(tmp.path().join("db"), config.write_retry).unwrap();
    let report = UuidDbBuilder::new(&config, &tools, &db).run().unwrap();

    assert!(report.mounted);
    assert!(mount_point.is_dir());
    assert_eq!(
        tools.calls()[0],
        format!("mount smb://test/symbolcache {}", mount_point.display())
    );
    assert_eq!(report.records.len(), 1);
}

#[test]
fn missing_manifest_after_mount_is_an_error() {
    let tmp = tempdir().unwrap();
    let config = UuidDbConfig {
        share: ShareConfig { server: "smb://test/x".into(), mount_point: tmp.path().join("share") },
        source_root: tmp.path().join("mnt"),
        ..UuidDbConfig::default()
    };
    let tools = FakeTools::new();
    let db = UuidDb::create(tmp.path().join("db"), config.write_retry).unwrap();

    let err = UuidDbBuilder::new(&config, &tools, &db).run().unwrap_err();
    assert!(matches!(err, UuidDbError::Manifest { .. }), "unexpected error: {err}");
    assert!(err.to_string().contains("uuidsources.txt"));
}

#[test]
fn missing_source_folder_is_reported() {
    let fx = Fixture::new("gone\nbuilds\n");
    let app = fx.source("builds/App");
    write_thin(&app);
    let tools = FakeTools::new().with_uuid(&app, None, APP_UUID);

    let db = fx.db();
    let report = UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap();

    assert_eq!(report.missing_sources, vec![fx.source("gone")]);
    assert_eq!(report.records.len(), 1);
}

#[test]
fn inspector_failure_aborts_the_run() {
    let fx = Fixture::new("builds\n");
    // Fat binary with no scripted universal-headers output: the fake fails.
    write_fat(&fx.source("builds/libBroken.dylib"));
    let tools = FakeTools::new();

    let db = fx.db();
    let err = UuidDbBuilder::new(&fx.config, &tools, &db).run().unwrap_err();
    assert!(matches!(err, UuidDbError::Tool(_)), "unexpected error: {err}");
}
