//! Settings resolution from the backuprc file and environment.
//!
//! The backuprc is a plain `KEY=VALUE` file (`#` comments and blank lines
//! ignored, the last occurrence of a key wins). Every recognized key can be
//! overridden by an environment variable of the same name, preserving the
//! original deployment channel while keeping one explicit, typed settings
//! struct as the only input every other component sees.

use crate::error::{Error, Result};
use crate::stamp::BackupStamp;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fs;

/// Default rc file name, looked up under $HOME.
pub const DEFAULT_RC_NAME: &str = ".backuprc";

/// Environment variable naming an alternative rc path.
pub const RC_PATH_VAR: &str = "BACKUPRC";

/// File name of the per-tree last-backup record, defaulted into each
/// archive directory when not configured explicitly.
pub const LAST_BACKUP_FILE_NAME: &str = "last_backup";

const DEFAULT_RETENTION_DAYS: u32 = 30;
const DEFAULT_FULL_DAY_OF_WEEK: u8 = 5;
const DEFAULT_NOTIFICATION_HOURS: u32 = 25;

/// Recognized configuration keys; each may come from the rc file or be
/// overridden by an environment variable of the same name.
pub const RECOGNIZED_KEYS: &[&str] = &[
    "TAR",
    "BACKUP_NAME",
    "MYSQL_USER",
    "MYSQL_PASSWORD",
    "REMOTE_USER",
    "REMOTE_HOST",
    "DIR_TO_BACKUP",
    "REMOTE_ARCHIVE_DIR",
    "LOCAL_ARCHIVE_DIR",
    "EXCLUDE_FILE",
    "LAST_BACKUP_FILE",
    "LOCAL_LAST_BACKUP_FILE",
    "REMOTE_RETENTION_DAYS",
    "LOCAL_RETENTION_DAYS",
    "FULL_DAY_OF_WEEK",
    "NOTIFICATION_HOURS",
    "TIMESTAMP",
];

/// Resolved, validated settings for one orchestrator invocation.
///
/// Built once per run; every path is absolute by the time other components
/// see it. The struct owns no state beyond the run (the file system is the
/// only durable store).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path to an external archiving utility (`TAR`). Accepted for rc
    /// compatibility and surfaced by `config show`; archiving itself runs
    /// in-process.
    pub archiver: Option<Utf8PathBuf>,

    /// Logical name embedded in archive filenames
    pub backup_name: String,

    /// Database credentials for the `dump` operation
    pub mysql_user: Option<String>,
    pub mysql_password: Option<String>,

    /// Remote endpoint identity for the `deploy` collaborator
    pub remote_user: Option<String>,
    pub remote_host: Option<String>,

    /// Source tree root
    pub dir_to_backup: Utf8PathBuf,

    /// Remote-facing archive tree
    pub remote_archive_dir: Utf8PathBuf,

    /// Local-facing archive tree
    pub local_archive_dir: Utf8PathBuf,

    /// Newline-delimited exclusion patterns; optional
    pub exclude_file: Option<Utf8PathBuf>,

    /// Last-backup record for the remote-facing tree
    pub last_backup_file: Utf8PathBuf,

    /// Last-backup record for the local-facing tree
    pub local_last_backup_file: Utf8PathBuf,

    /// Pruning window for the remote-facing tree, in whole days
    pub remote_retention_days: u32,

    /// Pruning window for the local-facing tree, in whole days
    pub local_retention_days: u32,

    /// Weekday (0-6, 0 = Sunday) that forces a FULL backup
    pub full_day_of_week: u8,

    /// Staleness threshold for the notification check, in hours
    pub notification_hours: u32,

    /// The run's identity stamp; wall clock unless overridden
    pub timestamp: BackupStamp,

    /// Path the settings were loaded from
    pub rc_path: Utf8PathBuf,
}

impl Settings {
    /// Load settings from the given rc path, or from `$BACKUPRC`, or from
    /// `$HOME/.backuprc`, applying environment overrides and validation.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let rc_path = resolve_rc_path(path)?;
        let content = fs::read_to_string(&rc_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(rc_path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let mut values = parse_rc(&content);
        apply_env_overrides(&mut values);
        Self::from_values(values, rc_path)
    }

    fn from_values(values: HashMap<String, String>, rc_path: Utf8PathBuf) -> Result<Self> {
        let backup_name = required(&values, "BACKUP_NAME")?;
        let dir_to_backup = absolutize(required(&values, "DIR_TO_BACKUP")?.into())?;
        let remote_archive_dir = absolutize(required(&values, "REMOTE_ARCHIVE_DIR")?.into())?;
        let local_archive_dir = absolutize(required(&values, "LOCAL_ARCHIVE_DIR")?.into())?;

        let last_backup_file = match optional_path(&values, "LAST_BACKUP_FILE")? {
            Some(p) => p,
            None => remote_archive_dir.join(LAST_BACKUP_FILE_NAME),
        };
        let local_last_backup_file = match optional_path(&values, "LOCAL_LAST_BACKUP_FILE")? {
            Some(p) => p,
            None => local_archive_dir.join(LAST_BACKUP_FILE_NAME),
        };

        let full_day_of_week = parse_u8(&values, "FULL_DAY_OF_WEEK", DEFAULT_FULL_DAY_OF_WEEK)?;
        if full_day_of_week > 6 {
            return Err(Error::invalid_value(
                "FULL_DAY_OF_WEEK",
                full_day_of_week.to_string(),
            ));
        }

        let timestamp = match values.get("TIMESTAMP") {
            Some(raw) => BackupStamp::parse(raw)?,
            None => BackupStamp::now(),
        };

        Ok(Self {
            archiver: optional_path(&values, "TAR")?,
            backup_name,
            mysql_user: optional(&values, "MYSQL_USER"),
            mysql_password: optional(&values, "MYSQL_PASSWORD"),
            remote_user: optional(&values, "REMOTE_USER"),
            remote_host: optional(&values, "REMOTE_HOST"),
            dir_to_backup,
            remote_archive_dir,
            local_archive_dir,
            exclude_file: optional_path(&values, "EXCLUDE_FILE")?,
            last_backup_file,
            local_last_backup_file,
            remote_retention_days: parse_u32(
                &values,
                "REMOTE_RETENTION_DAYS",
                DEFAULT_RETENTION_DAYS,
            )?,
            local_retention_days: parse_u32(
                &values,
                "LOCAL_RETENTION_DAYS",
                DEFAULT_RETENTION_DAYS,
            )?,
            full_day_of_week,
            notification_hours: parse_u32(
                &values,
                "NOTIFICATION_HOURS",
                DEFAULT_NOTIFICATION_HOURS,
            )?,
            timestamp,
            rc_path,
        })
    }

    /// Key/value view of the resolved settings for `config show`.
    /// The database password is redacted, never printed.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        fn opt(v: &Option<String>) -> String {
            v.clone().unwrap_or_else(|| "(unset)".to_string())
        }
        fn opt_path(v: &Option<Utf8PathBuf>) -> String {
            v.as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "(unset)".to_string())
        }

        vec![
            ("Config file", self.rc_path.to_string()),
            ("Backup name", self.backup_name.clone()),
            ("Directory to back up", self.dir_to_backup.to_string()),
            ("Remote archive dir", self.remote_archive_dir.to_string()),
            ("Local archive dir", self.local_archive_dir.to_string()),
            ("Exclude file", opt_path(&self.exclude_file)),
            ("Last-backup record (remote)", self.last_backup_file.to_string()),
            (
                "Last-backup record (local)",
                self.local_last_backup_file.to_string(),
            ),
            (
                "Remote retention (days)",
                self.remote_retention_days.to_string(),
            ),
            (
                "Local retention (days)",
                self.local_retention_days.to_string(),
            ),
            (
                "Full backup weekday (0=Sun)",
                self.full_day_of_week.to_string(),
            ),
            (
                "Notification threshold (hours)",
                self.notification_hours.to_string(),
            ),
            ("Timestamp", self.timestamp.to_string()),
            ("Remote user", opt(&self.remote_user)),
            ("Remote host", opt(&self.remote_host)),
            ("MySQL user", opt(&self.mysql_user)),
            (
                "MySQL password",
                self.mysql_password
                    .as_ref()
                    .map(|_| "********".to_string())
                    .unwrap_or_else(|| "(unset)".to_string()),
            ),
            ("Archiver utility", opt_path(&self.archiver)),
        ]
    }
}

/// Resolve the rc path: explicit flag, then `$BACKUPRC`, then `$HOME/.backuprc`.
pub fn resolve_rc_path(explicit: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    if let Some(p) = explicit {
        return absolutize(p.to_owned());
    }
    if let Ok(p) = std::env::var(RC_PATH_VAR) {
        return absolutize(Utf8PathBuf::from(p));
    }
    let home = std::env::var("HOME")
        .map_err(|_| Error::invalid_config("HOME is not set; pass --config explicitly"))?;
    Ok(Utf8PathBuf::from(home).join(DEFAULT_RC_NAME))
}

/// A commented sample rc, written by `config init`.
pub fn sample_rc() -> &'static str {
    "\
# simple-backup configuration
#
# Every key can also be supplied as an environment variable of the
# same name; the environment wins over this file.

BACKUP_NAME=backup_name

# Tree to archive; its leaf directory name becomes the top-level
# entry inside every archive.
DIR_TO_BACKUP=/home/me

# Remote-facing tree receives new archives; the local-facing tree is
# an additive mirror of it.
REMOTE_ARCHIVE_DIR=/srv/backup/remote
LOCAL_ARCHIVE_DIR=/srv/backup/local

# Newline-delimited exclusion patterns; a bare directory name excludes
# that directory anywhere in the tree, together with its subtree.
#EXCLUDE_FILE=/home/me/.backupexclude

# Archives older than this many whole days are pruned, per tree.
REMOTE_RETENTION_DAYS=30
LOCAL_RETENTION_DAYS=30

# Weekday that forces a full backup (0 = Sunday .. 6 = Saturday).
FULL_DAY_OF_WEEK=5

# `check` exits non-zero when the last successful backup is older
# than this many hours.
NOTIFICATION_HOURS=25

# Remote endpoint for `deploy`.
#REMOTE_USER=me
#REMOTE_HOST=backup.example.net

# Database credentials for `dump`.
#MYSQL_USER=backup
#MYSQL_PASSWORD=secret
"
}

/// Parse `KEY=VALUE` lines; `#` comments and blanks are skipped, later
/// occurrences of a key win.
fn parse_rc(content: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            values.insert(key.trim().to_string(), value.trim().to_string());
        } else {
            tracing::debug!(line, "ignoring malformed rc line");
        }
    }
    values
}

fn apply_env_overrides(values: &mut HashMap<String, String>) {
    for key in RECOGNIZED_KEYS {
        if let Ok(value) = std::env::var(key) {
            values.insert((*key).to_string(), value);
        }
    }
}

fn required(values: &HashMap<String, String>, key: &str) -> Result<String> {
    values
        .get(key)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| Error::missing_key(key))
}

fn optional(values: &HashMap<String, String>, key: &str) -> Option<String> {
    values.get(key).filter(|v| !v.is_empty()).cloned()
}

fn optional_path(values: &HashMap<String, String>, key: &str) -> Result<Option<Utf8PathBuf>> {
    match optional(values, key) {
        Some(raw) => Ok(Some(absolutize(Utf8PathBuf::from(raw))?)),
        None => Ok(None),
    }
}

fn parse_u32(values: &HashMap<String, String>, key: &str, default: u32) -> Result<u32> {
    match values.get(key).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| Error::invalid_value(key, raw.clone())),
        None => Ok(default),
    }
}

fn parse_u8(values: &HashMap<String, String>, key: &str, default: u8) -> Result<u8> {
    match values.get(key).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse::<u8>()
            .map_err(|_| Error::invalid_value(key, raw.clone())),
        None => Ok(default),
    }
}

/// Anchor relative paths at the current working directory so every
/// component downstream of the resolver sees absolute paths only.
fn absolutize(path: Utf8PathBuf) -> Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(Error::Io)?;
    let cwd = Utf8PathBuf::try_from(cwd)
        .map_err(|_| Error::invalid_config("current directory path is not valid UTF-8"))?;
    Ok(cwd.join(path))
}
