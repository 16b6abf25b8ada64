//! Acceptance tests for the simple-backup binary.
//!
//! These drive the built executable against a throwaway directory layout
//! (a `remote/home` tree whose archive dir sits inside it, plus a mirrored
//! `local/home/backup` tree) and assert on the file-system side effects:
//! archive contents, the last-backup record, retention pruning, mirror
//! idempotence, and the staleness exit code.

use assert_cmd::Command;
use chrono::{Datelike, Duration, NaiveDateTime, Utc};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

struct Fixture {
    _temp: TempDir,
    rc: PathBuf,
    home: PathBuf,
    remote_backup: PathBuf,
    local_backup: PathBuf,
}

/// Directory layout used by every scenario. The remote archive dir lives
/// inside the backed-up tree, like the setup this tool is meant for, and
/// the configured full-backup weekday never matches the day the tests run.
fn fixture() -> Fixture {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("remote/home");
    let remote_backup = home.join("backup");
    let local_backup = temp.path().join("local/home/backup");
    fs::create_dir_all(&home).unwrap();
    fs::create_dir_all(&remote_backup).unwrap();
    fs::create_dir_all(&local_backup).unwrap();

    let exclude = temp.path().join("backupexclude");
    fs::write(&exclude, "tmp\n").unwrap();

    let full_day = (Utc::now().weekday().num_days_from_sunday() + 1) % 7;

    let rc = temp.path().join("backuprc");
    fs::write(
        &rc,
        format!(
            "BACKUP_NAME=backup_name\n\
             DIR_TO_BACKUP={}\n\
             REMOTE_ARCHIVE_DIR={}\n\
             LOCAL_ARCHIVE_DIR={}\n\
             EXCLUDE_FILE={}\n\
             FULL_DAY_OF_WEEK={}\n\
             REMOTE_RETENTION_DAYS=30\n\
             LOCAL_RETENTION_DAYS=30\n\
             NOTIFICATION_HOURS=25\n",
            home.display(),
            remote_backup.display(),
            local_backup.display(),
            exclude.display(),
            full_day,
        ),
    )
    .unwrap();

    Fixture {
        _temp: temp,
        rc,
        home,
        remote_backup,
        local_backup,
    }
}

fn cmd(fx: &Fixture) -> Command {
    let mut cmd = Command::cargo_bin("simple-backup").unwrap();
    cmd.arg("--config").arg(&fx.rc);
    cmd
}

fn stamp_ago(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours))
        .format(STAMP_FORMAT)
        .to_string()
}

fn backdate(path: &Path, seconds: u64) {
    let file = fs::OpenOptions::new().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - std::time::Duration::from_secs(seconds))
        .unwrap();
}

/// The single `backup_name-fs-*.tar.gz` in the directory.
fn find_archive(dir: &Path) -> PathBuf {
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let name = p.file_name().unwrap().to_string_lossy().to_string();
            name.starts_with("backup_name-fs-") && name.ends_with(".tar.gz")
        })
        .collect();
    assert_eq!(matches.len(), 1, "expected exactly one archive in {dir:?}");
    matches.remove(0)
}

/// Entry names with trailing slashes trimmed, in archive order.
fn tar_contents(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(file));
    archive
        .entries()
        .unwrap()
        .map(|e| {
            e.unwrap()
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string()
        })
        .collect()
}

#[test]
fn full_backup_captures_every_file() {
    let fx = fixture();
    fs::write(fx.home.join("file_one"), "1").unwrap();
    fs::write(fx.home.join("file_two"), "2").unwrap();
    fs::write(fx.home.join("file_three"), "3").unwrap();

    cmd(&fx).arg("backup").assert().success();

    let contents = tar_contents(&find_archive(&fx.remote_backup));
    assert_eq!(contents.len(), 4);
    assert!(contents.contains(&"home".to_string()));
    assert!(contents.contains(&"home/file_one".to_string()));
    assert!(contents.contains(&"home/file_two".to_string()));
    assert!(contents.contains(&"home/file_three".to_string()));
}

#[test]
fn excluded_directory_is_absent_from_the_archive() {
    let fx = fixture();
    fs::write(fx.home.join("file_one"), "1").unwrap();
    fs::create_dir_all(fx.home.join("tmp")).unwrap();
    fs::write(fx.home.join("tmp/file_two"), "2").unwrap();

    cmd(&fx).arg("backup").assert().success();

    let contents = tar_contents(&find_archive(&fx.remote_backup));
    assert_eq!(contents.len(), 2);
    assert!(contents.contains(&"home".to_string()));
    assert!(contents.contains(&"home/file_one".to_string()));
}

#[test]
fn second_backup_is_incremental() {
    let fx = fixture();
    fs::write(fx.home.join("file_one"), "1").unwrap();
    backdate(&fx.home.join("file_one"), 7200);

    cmd(&fx)
        .arg("backup")
        .env("TIMESTAMP", stamp_ago(1))
        .assert()
        .success();
    fs::rename(
        find_archive(&fx.remote_backup),
        fx.remote_backup.join("1.tar.gz"),
    )
    .unwrap();

    fs::write(fx.home.join("file_two"), "2").unwrap();

    cmd(&fx)
        .arg("backup")
        .env("TIMESTAMP", stamp_ago(0))
        .assert()
        .success();
    fs::rename(
        find_archive(&fx.remote_backup),
        fx.remote_backup.join("2.tar.gz"),
    )
    .unwrap();

    let contents = tar_contents(&fx.remote_backup.join("2.tar.gz"));
    assert_eq!(contents.len(), 2);
    assert!(contents.contains(&"home".to_string()));
    assert!(contents.contains(&"home/file_two".to_string()));
}

#[test]
fn incremental_with_no_changes_keeps_only_the_marker() {
    let fx = fixture();
    fs::write(fx.home.join("file_one"), "1").unwrap();
    backdate(&fx.home.join("file_one"), 7200);

    cmd(&fx)
        .arg("backup")
        .env("TIMESTAMP", stamp_ago(1))
        .assert()
        .success();

    let second_stamp = stamp_ago(0);
    cmd(&fx)
        .arg("backup")
        .env("TIMESTAMP", &second_stamp)
        .assert()
        .success();

    // The first archive still carries its own stamp; the second is the
    // one named with the fresh stamp.
    let second = fx
        .remote_backup
        .join(format!("backup_name-fs-{second_stamp}.tar.gz"));
    let contents = tar_contents(&second);
    assert_eq!(contents, vec!["home"]);
}

#[test]
fn forced_full_backup_ignores_history() {
    let fx = fixture();
    fs::write(fx.home.join("file_one"), "1").unwrap();
    backdate(&fx.home.join("file_one"), 7200);

    cmd(&fx)
        .arg("backup")
        .env("TIMESTAMP", stamp_ago(1))
        .assert()
        .success();

    let second_stamp = stamp_ago(0);
    cmd(&fx)
        .arg("backup")
        .arg("--full")
        .env("TIMESTAMP", &second_stamp)
        .assert()
        .success();

    let second = fx
        .remote_backup
        .join(format!("backup_name-fs-{second_stamp}.tar.gz"));
    let contents = tar_contents(&second);
    assert_eq!(contents.len(), 2);
    assert!(contents.contains(&"home/file_one".to_string()));
}

#[test]
fn sync_mirrors_archive_files_and_is_idempotent() {
    let fx = fixture();
    fs::write(fx.remote_backup.join("file_one"), "1").unwrap();
    fs::write(fx.remote_backup.join("file_two"), "2").unwrap();
    fs::write(fx.remote_backup.join("file_three"), "3").unwrap();

    cmd(&fx).arg("sync").assert().success();

    for name in ["file_one", "file_two", "file_three"] {
        assert!(fx.local_backup.join(name).exists());
    }

    let output = cmd(&fx).arg("sync").arg("--json").assert().success();
    let report: serde_json::Value =
        serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(report["copied"], 0);
    assert_eq!(report["skipped"], 3);
}

#[test]
fn last_backup_record_contains_the_run_stamp() {
    let fx = fixture();
    fs::write(fx.home.join("file_one"), "1").unwrap();

    cmd(&fx)
        .arg("backup")
        .env("TIMESTAMP", "20260401-121500")
        .assert()
        .success();

    let record = fs::read_to_string(fx.remote_backup.join("last_backup")).unwrap();
    assert!(record.contains("20260401-121500"));
}

#[test]
fn failed_backup_leaves_no_record_and_no_archive() {
    let fx = fixture();
    fs::remove_dir_all(&fx.home).unwrap();

    cmd(&fx).arg("backup").assert().failure();

    assert!(!fx.remote_backup.exists() || !fx.remote_backup.join("last_backup").exists());
}

#[test]
fn check_reports_staleness_through_the_exit_code() {
    let fx = fixture();
    fs::write(fx.remote_backup.join("last_backup"), "20260107-120000\n").unwrap();

    // 25h01m past the record with a 25h threshold: stale.
    cmd(&fx)
        .arg("check")
        .env("TIMESTAMP", "20260108-130100")
        .assert()
        .failure()
        .code(1);

    // 24h59m past the record: fresh.
    cmd(&fx)
        .arg("check")
        .env("TIMESTAMP", "20260108-125900")
        .assert()
        .success();
}

#[test]
fn check_without_a_record_is_stale() {
    let fx = fixture();
    cmd(&fx)
        .arg("check")
        .arg("--json")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("\"stale\":true"));
}

#[test]
fn prune_removes_only_archives_past_the_window() {
    let fx = fixture();
    let now = NaiveDateTime::parse_from_str("20260601-000000", STAMP_FORMAT).unwrap();

    let mut paths = Vec::new();
    for days in [0i64, 5, 29, 30, 31] {
        let stamp = (now - Duration::days(days)).format(STAMP_FORMAT);
        let path = fx
            .remote_backup
            .join(format!("backup_name-fs-{stamp}.tar.gz"));
        fs::write(&path, "archive").unwrap();
        paths.push((days, path));
    }
    fs::write(fx.remote_backup.join("last_backup"), "20260601-000000\n").unwrap();

    cmd(&fx)
        .arg("prune")
        .arg("--yes")
        .env("TIMESTAMP", "20260601-000000")
        .assert()
        .success();

    for (days, path) in paths {
        assert_eq!(path.exists(), days <= 30, "age {days} days");
    }
    assert!(fx.remote_backup.join("last_backup").exists());
}

#[test]
fn config_show_redacts_the_database_password() {
    let fx = fixture();
    let mut rc = fs::read_to_string(&fx.rc).unwrap();
    rc.push_str("MYSQL_USER=backup\nMYSQL_PASSWORD=hunter2\n");
    fs::write(&fx.rc, rc).unwrap();

    cmd(&fx)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backup_name"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn config_init_refuses_to_overwrite() {
    let fx = fixture();
    let dest = fx._temp.path().join("newrc");

    cmd(&fx)
        .args(["config", "init", "--output"])
        .arg(&dest)
        .assert()
        .success();
    assert!(fs::read_to_string(&dest).unwrap().contains("BACKUP_NAME"));

    cmd(&fx)
        .args(["config", "init", "--output"])
        .arg(&dest)
        .assert()
        .failure();
}

#[test]
fn missing_config_file_fails_cleanly() {
    let fx = fixture();
    let mut cmd = Command::cargo_bin("simple-backup").unwrap();
    cmd.arg("--config")
        .arg(fx._temp.path().join("absent"))
        .arg("backup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}
