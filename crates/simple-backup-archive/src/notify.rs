//! Staleness decision for the notification check.

use chrono::Duration;
use simple_backup_core::BackupStamp;

/// True when a notification is warranted: the last-backup record is absent,
/// or the last successful backup is strictly older than the threshold.
///
/// Pure decision; the caller owns the notification side effect and the
/// exit-status convention.
pub fn should_notify(now: &BackupStamp, last: Option<&BackupStamp>, threshold_hours: u32) -> bool {
    match last {
        None => true,
        Some(last) => {
            let age = now.datetime().signed_duration_since(last.datetime());
            age > Duration::hours(i64::from(threshold_hours))
        }
    }
}
