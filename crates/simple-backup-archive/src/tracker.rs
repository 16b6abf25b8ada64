//! The last-backup record.
//!
//! One plain-text file per archive tree holds the stamp of the most recent
//! successful backup. Reading is substring-tolerant: the first parseable
//! stamp anywhere in the file wins, so hand-edited or annotated records
//! still resolve. Writing goes through a temp file in the same directory,
//! fsync, then rename, so a crash mid-update never leaves a corrupt record.

use simple_backup_core::{BackupStamp, Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and updates one tree's last-backup record.
#[derive(Debug, Clone)]
pub struct LastBackupTracker {
    path: PathBuf,
}

impl LastBackupTracker {
    /// A tracker over the given record path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The record path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The recorded stamp, or `None` when no record exists yet.
    pub fn read(&self) -> Result<Option<BackupStamp>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Io(e)),
        };

        for token in content.split_whitespace() {
            if let Ok(stamp) = BackupStamp::parse(token) {
                return Ok(Some(stamp));
            }
        }

        tracing::warn!(record = %self.path.display(), "last-backup record holds no stamp");
        Ok(None)
    }

    /// Overwrites the record with `stamp`, atomically.
    pub fn record(&self, stamp: &BackupStamp) -> Result<()> {
        let fail = |e: std::io::Error| {
            Error::tracker_write(self.path.display().to_string(), e.to_string())
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(fail)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut temp = fs::File::create(&temp_path).map_err(fail)?;
        writeln!(temp, "{stamp}").map_err(fail)?;
        temp.sync_all().map_err(fail)?;
        drop(temp);

        fs::rename(&temp_path, &self.path).map_err(fail)?;
        tracing::debug!(record = %self.path.display(), %stamp, "last-backup record updated");
        Ok(())
    }
}
