//! Full vs incremental backup planning.

use chrono::Datelike;
use simple_backup_core::BackupStamp;
use std::fmt;

/// The planner's decision for one archiving run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupMode {
    /// Capture the entire source tree
    Full,

    /// Capture only entries changed since the last successful backup
    Incremental,
}

impl fmt::Display for BackupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupMode::Full => write!(f, "full"),
            BackupMode::Incremental => write!(f, "incremental"),
        }
    }
}

/// Decides whether this run archives the full tree or an increment.
///
/// `last_backup` is `None` when the tree has no usable history: either no
/// last-backup record exists, or the archive directory holds no archive
/// files. Rules, in priority order: forced full, first run, configured
/// full-backup weekday (0 = Sunday, matching `date +%w`), otherwise
/// incremental. Pure; the caller owns all side effects.
pub fn plan(
    now: &BackupStamp,
    last_backup: Option<BackupStamp>,
    force_full: bool,
    full_day_of_week: u8,
) -> BackupMode {
    if force_full {
        return BackupMode::Full;
    }
    if last_backup.is_none() {
        return BackupMode::Full;
    }
    if now.datetime().weekday().num_days_from_sunday() as u8 == full_day_of_week {
        return BackupMode::Full;
    }
    BackupMode::Incremental
}
