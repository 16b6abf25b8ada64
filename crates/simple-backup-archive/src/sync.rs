//! Additive mirroring between archive trees.
//!
//! Every regular file in the source directory is copied into the
//! destination under the same name. A file whose destination already exists
//! with the same size and a modification time at least as new is skipped,
//! so a re-run with no source changes copies nothing. Files are never
//! deleted from the destination. Per-file failures are recorded and the
//! pass continues.

use serde::Serialize;
use simple_backup_core::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One file that could not be copied.
#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    /// Source path of the file
    pub path: PathBuf,

    /// Why the copy failed
    pub message: String,
}

/// Outcome of one mirror pass.
#[derive(Debug, Default, Serialize)]
pub struct SyncReport {
    /// Files copied to the destination
    pub copied: Vec<PathBuf>,

    /// Files already up to date
    pub skipped: usize,

    /// Copies that failed; the pass continued past each
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    /// Number of files copied.
    pub fn count_copied(&self) -> usize {
        self.copied.len()
    }
}

/// Mirrors the regular files of `source_dir` into `dest_dir`.
pub fn sync(source_dir: &Path, dest_dir: &Path) -> Result<SyncReport> {
    let entries = fs::read_dir(source_dir).map_err(|e| {
        Error::source_unreadable(source_dir.display().to_string(), e.to_string())
    })?;

    fs::create_dir_all(dest_dir).map_err(|e| {
        Error::destination_unwritable(dest_dir.display().to_string(), e.to_string())
    })?;

    let mut report = SyncReport::default();

    for entry in entries {
        let entry = entry.map_err(Error::Io)?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let source = entry.path();
        let dest = dest_dir.join(entry.file_name());

        match up_to_date(&source, &dest) {
            Ok(true) => {
                report.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(file = %source.display(), error = %e, "failed to stat for sync");
                report.failures.push(SyncFailure {
                    path: source,
                    message: e.to_string(),
                });
                continue;
            }
        }

        match fs::copy(&source, &dest) {
            Ok(_) => {
                tracing::debug!(file = %dest.display(), "mirrored archive file");
                report.copied.push(dest);
            }
            Err(e) => {
                tracing::warn!(file = %source.display(), error = %e, "failed to mirror file");
                report.failures.push(SyncFailure {
                    path: source,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// True when `dest` exists with the same size as `source` and is not older.
fn up_to_date(source: &Path, dest: &Path) -> std::io::Result<bool> {
    let dest_meta = match fs::metadata(dest) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    let source_meta = fs::metadata(source)?;

    Ok(dest_meta.len() == source_meta.len()
        && dest_meta.modified()? >= source_meta.modified()?)
}
