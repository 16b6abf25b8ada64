//! Retention pruning.
//!
//! Archives older than the retention window are deleted; everything else in
//! the directory is left alone. Only filenames the namer recognizes are
//! considered, so renamed archives, the last-backup record, and foreign
//! files are never touched. Deletion is best-effort per file: one failure
//! is recorded and the pass continues.

use crate::naming;
use chrono::Duration;
use serde::Serialize;
use simple_backup_core::{BackupStamp, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One file that could not be deleted.
#[derive(Debug, Clone, Serialize)]
pub struct PruneFailure {
    /// Path of the archive that survived
    pub path: PathBuf,

    /// Why the delete failed
    pub message: String,
}

/// Outcome of one retention pass over one directory.
#[derive(Debug, Default, Serialize)]
pub struct PruneReport {
    /// Archives removed
    pub removed: Vec<PathBuf>,

    /// Archives still inside the window
    pub retained: usize,

    /// Deletes that failed; the pass continued past each
    pub failures: Vec<PruneFailure>,
}

impl PruneReport {
    /// Number of archives removed.
    pub fn count_removed(&self) -> usize {
        self.removed.len()
    }
}

/// Archives in `archive_dir` whose age exceeds the window.
///
/// Age is `now` minus the stamp embedded in the filename; the boundary is
/// exclusive, so an archive aged exactly `retention_days` days is retained.
/// A missing directory yields an empty list.
pub fn expired(
    archive_dir: &Path,
    logical_name: &str,
    retention_days: u32,
    now: &BackupStamp,
) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(archive_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %archive_dir.display(), "no archive directory, nothing to prune");
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let window = Duration::days(i64::from(retention_days));
    let mut expired = Vec::new();

    for entry in entries {
        let entry = entry.map_err(Error::Io)?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some((_, stamp)) = naming::parse(file_name, logical_name) else {
            continue;
        };
        if now.datetime().signed_duration_since(stamp.datetime()) > window {
            expired.push(entry.path());
        }
    }

    expired.sort();
    Ok(expired)
}

/// Runs one retention pass over `archive_dir`.
pub fn prune(
    archive_dir: &Path,
    logical_name: &str,
    retention_days: u32,
    now: &BackupStamp,
) -> Result<PruneReport> {
    let expired = expired(archive_dir, logical_name, retention_days, now)?;

    let mut report = PruneReport::default();
    for path in expired {
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(archive = %path.display(), "pruned expired archive");
                report.removed.push(path);
            }
            Err(e) => {
                tracing::warn!(archive = %path.display(), error = %e, "failed to prune archive");
                report.failures.push(PruneFailure {
                    path,
                    message: e.to_string(),
                });
            }
        }
    }

    // Count survivors the namer recognizes.
    if let Ok(entries) = fs::read_dir(archive_dir) {
        report.retained = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(|n| n.to_string()))
            .filter(|n| naming::parse(n, logical_name).is_some())
            .count();
    }

    Ok(report)
}
