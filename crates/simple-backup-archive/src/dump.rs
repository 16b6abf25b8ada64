//! Database dump archiving.
//!
//! Runs `mysqldump` as a subprocess, spools the dump into a temporary
//! directory, and archives it in-process as the single entry `<name>.sql`
//! inside a `-db-` archive next to the filesystem archives. The password
//! travels via the `MYSQL_PWD` environment variable, never on the command
//! line. The same partial-then-rename discipline as the filesystem
//! archiver applies.

use crate::archive::{calculate_checksum, DEFAULT_COMPRESSION_LEVEL};
use crate::naming::{self, ArchiveFile, ArchiveKind};
use flate2::write::GzEncoder;
use flate2::Compression;
use simple_backup_core::{BackupStamp, Error, Result};
use std::fs::File;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tar::Builder as TarBuilder;
use tokio::process::Command;

/// The dump utility looked up on PATH.
const DUMP_TOOL: &str = "mysqldump";

/// Result of a successful dump run.
#[derive(Debug, Clone)]
pub struct DumpOutcome {
    /// The archive that was produced
    pub archive: ArchiveFile,

    /// Size of the archive in bytes
    pub size_bytes: u64,

    /// SHA-256 of the archive, hex encoded
    pub checksum: String,

    /// Duration of the run in seconds
    pub duration_seconds: f64,
}

/// Dumps all databases and archives the dump into `dest_dir`.
pub async fn dump_database(
    logical_name: &str,
    stamp: &BackupStamp,
    user: &str,
    password: Option<&str>,
    dest_dir: &Path,
) -> Result<DumpOutcome> {
    let start = Instant::now();

    let tool = which::which(DUMP_TOOL)
        .map_err(|_| Error::command_failed(DUMP_TOOL, "not found on PATH"))?;

    let spool_dir = tempfile::tempdir()?;
    let spool_path = spool_dir.path().join(format!("{logical_name}.sql"));
    let spool = File::create(&spool_path)?;

    let mut cmd = Command::new(&tool);
    cmd.arg("--user")
        .arg(user)
        .arg("--all-databases")
        .arg("--single-transaction")
        .stdout(Stdio::from(spool))
        .stderr(Stdio::piped());
    if let Some(password) = password {
        cmd.env("MYSQL_PWD", password);
    }

    tracing::debug!(tool = %tool.display(), "running database dump");
    let output = cmd
        .spawn()
        .map_err(|e| Error::command_failed(DUMP_TOOL, e.to_string()))?
        .wait_with_output()
        .await
        .map_err(|e| Error::command_failed(DUMP_TOOL, e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::command_failed(
            DUMP_TOOL,
            format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        ));
    }

    let file_name = naming::file_name(ArchiveKind::Database, logical_name, stamp);
    let final_path = dest_dir.join(&file_name);
    let partial_path = dest_dir.join(format!("{file_name}.partial"));

    let out = File::create(&partial_path).map_err(|e| {
        Error::destination_unwritable(dest_dir.display().to_string(), e.to_string())
    })?;

    let write = || -> std::io::Result<()> {
        let encoder = GzEncoder::new(out, Compression::new(DEFAULT_COMPRESSION_LEVEL));
        let mut tar = TarBuilder::new(encoder);
        tar.append_path_with_name(&spool_path, format!("{logical_name}.sql"))?;
        let encoder = tar.into_inner()?;
        encoder.finish()?.sync_all()
    };
    if let Err(e) = write() {
        let _ = std::fs::remove_file(&partial_path);
        return Err(Error::archive_failed(e.to_string()));
    }

    std::fs::rename(&partial_path, &final_path).map_err(|e| {
        let _ = std::fs::remove_file(&partial_path);
        Error::destination_unwritable(dest_dir.display().to_string(), e.to_string())
    })?;

    let size_bytes = std::fs::metadata(&final_path)?.len();
    let checksum = calculate_checksum(&final_path)?;

    tracing::info!(archive = %final_path.display(), bytes = size_bytes, "database dump archived");

    Ok(DumpOutcome {
        archive: ArchiveFile {
            kind: ArchiveKind::Database,
            name: logical_name.to_string(),
            stamp: *stamp,
            path: final_path,
        },
        size_bytes,
        checksum,
        duration_seconds: start.elapsed().as_secs_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_tool_is_command_failed() {
        // Empty PATH guarantees the lookup cannot succeed.
        let original = std::env::var_os("PATH");
        std::env::set_var("PATH", "");

        let temp = TempDir::new().unwrap();
        let stamp = BackupStamp::parse("20260101-120000").unwrap();
        let result = dump_database("nightly", &stamp, "backup", None, temp.path()).await;

        match original {
            Some(path) => std::env::set_var("PATH", path),
            None => std::env::remove_var("PATH"),
        }

        assert!(matches!(result, Err(Error::CommandFailed { .. })));
    }
}
