//! Archive creation.
//!
//! Walks the source tree, applies exclusions and the incremental cut, and
//! streams the selected entries through tar + gzip into the destination
//! directory. Entries are stored relative to the source tree's parent, so
//! the tree's leaf directory name is the top-level entry of every archive
//! and the leaf marker is present even when an increment captures nothing.
//!
//! The archive is written under a `.partial` name and renamed into place
//! only after a clean finish; a failed run removes the partial output and
//! leaves all durable state untouched.

use crate::filters::ExclusionSet;
use crate::naming::{self, ArchiveFile, ArchiveKind};
use crate::planner::BackupMode;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use simple_backup_core::{BackupStamp, Error, Result};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tar::Builder as TarBuilder;
use walkdir::WalkDir;

/// Default gzip level (6 = balanced speed/ratio).
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Options for one archive run.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Full tree or increment
    pub mode: BackupMode,

    /// Compiled exclusion patterns
    pub exclusions: ExclusionSet,

    /// Incremental cut: include files modified strictly after this stamp
    pub changed_since: Option<BackupStamp>,

    /// Gzip level (1-9)
    pub compression_level: u32,
}

impl ArchiveOptions {
    /// Options for a full run with no exclusions.
    pub fn new(mode: BackupMode) -> Self {
        Self {
            mode,
            exclusions: ExclusionSet::empty(),
            changed_since: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }

    /// Sets the exclusion set.
    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Sets the incremental cut.
    pub fn with_changed_since(mut self, stamp: Option<BackupStamp>) -> Self {
        self.changed_since = stamp;
        self
    }

    /// Sets the gzip level, clamped to 1-9.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.clamp(1, 9);
        self
    }
}

/// Result of a successful archive run.
#[derive(Debug, Clone)]
pub struct ArchiveOutcome {
    /// The archive that was produced
    pub archive: ArchiveFile,

    /// Entries stored, including the leaf directory marker
    pub entry_count: usize,

    /// Size of the archive in bytes
    pub size_bytes: u64,

    /// SHA-256 of the archive, hex encoded
    pub checksum: String,

    /// Duration of the run in seconds
    pub duration_seconds: f64,
}

/// Writes one archive per invocation.
pub struct ArchiveWriter {
    logical_name: String,
    stamp: BackupStamp,
    options: ArchiveOptions,
}

impl ArchiveWriter {
    /// Creates a writer for the given run identity.
    pub fn new(logical_name: impl Into<String>, stamp: BackupStamp, options: ArchiveOptions) -> Self {
        Self {
            logical_name: logical_name.into(),
            stamp,
            options,
        }
    }

    /// Archives `source_tree` into `dest_dir`.
    ///
    /// Produces exactly one archive at
    /// `dest_dir/<name>-fs-<stamp>.tar.gz` on success. On failure no
    /// archive is left behind.
    pub async fn create(&self, source_tree: &Path, dest_dir: &Path) -> Result<ArchiveOutcome> {
        let start = Instant::now();

        let meta = std::fs::metadata(source_tree).map_err(|e| {
            Error::source_unreadable(source_tree.display().to_string(), e.to_string())
        })?;
        if !meta.is_dir() {
            return Err(Error::source_unreadable(
                source_tree.display().to_string(),
                "not a directory",
            ));
        }
        let leaf = source_tree.file_name().map(PathBuf::from).ok_or_else(|| {
            Error::source_unreadable(
                source_tree.display().to_string(),
                "tree has no leaf directory name",
            )
        })?;

        let (dirs, files) = self.scan(source_tree, dest_dir)?;
        tracing::debug!(
            mode = %self.options.mode,
            dirs = dirs.len(),
            files = files.len(),
            "scanned source tree"
        );

        let file_name = naming::file_name(ArchiveKind::Filesystem, &self.logical_name, &self.stamp);
        let final_path = dest_dir.join(&file_name);
        let partial_path = dest_dir.join(format!("{file_name}.partial"));

        let out = File::create(&partial_path).map_err(|e| {
            Error::destination_unwritable(dest_dir.display().to_string(), e.to_string())
        })?;

        let entry_count = match self.write_entries(out, source_tree, &leaf, &dirs, &files) {
            Ok(count) => count,
            Err(e) => {
                // Partial output is invalid; discard before surfacing the error.
                let _ = std::fs::remove_file(&partial_path);
                return Err(e);
            }
        };

        std::fs::rename(&partial_path, &final_path).map_err(|e| {
            let _ = std::fs::remove_file(&partial_path);
            Error::destination_unwritable(dest_dir.display().to_string(), e.to_string())
        })?;

        let size_bytes = std::fs::metadata(&final_path)?.len();
        let checksum = calculate_checksum(&final_path)?;
        let duration_seconds = start.elapsed().as_secs_f64();

        tracing::info!(
            archive = %final_path.display(),
            entries = entry_count,
            bytes = size_bytes,
            "archive created"
        );

        Ok(ArchiveOutcome {
            archive: ArchiveFile {
                kind: ArchiveKind::Filesystem,
                name: self.logical_name.clone(),
                stamp: self.stamp,
                path: final_path,
            },
            entry_count,
            size_bytes,
            checksum,
            duration_seconds,
        })
    }

    /// Walks the tree and splits the selection into directories and files,
    /// both relative to `source_tree`. The root itself is not returned; the
    /// leaf marker is always appended by the writer. The destination
    /// directory is skipped when it lives inside the tree, so archives
    /// never swallow their own output.
    fn scan(&self, source_tree: &Path, dest_dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let mut dirs = Vec::new();
        let mut files = Vec::new();

        let walk = WalkDir::new(source_tree)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| {
                if e.path() == dest_dir {
                    return false;
                }
                let rel = e.path().strip_prefix(source_tree).unwrap_or(e.path());
                rel.as_os_str().is_empty() || !self.options.exclusions.is_match(rel)
            });

        for entry in walk {
            let entry = entry.map_err(|e| {
                Error::source_unreadable(source_tree.display().to_string(), e.to_string())
            })?;
            let rel = entry
                .path()
                .strip_prefix(source_tree)
                .unwrap_or(entry.path())
                .to_path_buf();
            if rel.as_os_str().is_empty() {
                continue;
            }

            if entry.file_type().is_dir() {
                // Increments carry no directory entries; extraction creates
                // parents as needed and the marker covers the empty case.
                if self.options.mode == BackupMode::Full {
                    dirs.push(rel);
                }
            } else if entry.file_type().is_file() {
                if self.includes_file(&entry)? {
                    files.push(rel);
                }
            }
            // Symlinks and special files are skipped.
        }

        Ok((dirs, files))
    }

    fn includes_file(&self, entry: &walkdir::DirEntry) -> Result<bool> {
        if self.options.mode == BackupMode::Full {
            return Ok(true);
        }
        let cut = match self.options.changed_since {
            Some(cut) => cut,
            None => return Ok(true),
        };
        let meta = entry.metadata().map_err(|e| {
            Error::source_unreadable(entry.path().display().to_string(), e.to_string())
        })?;
        let modified = meta.modified().map_err(|e| {
            Error::source_unreadable(entry.path().display().to_string(), e.to_string())
        })?;
        let modified: DateTime<Utc> = modified.into();
        Ok(modified > cut.datetime())
    }

    fn write_entries(
        &self,
        out: File,
        source_tree: &Path,
        leaf: &Path,
        dirs: &[PathBuf],
        files: &[PathBuf],
    ) -> Result<usize> {
        let encoder = GzEncoder::new(out, Compression::new(self.options.compression_level));
        let mut tar = TarBuilder::new(encoder);

        let fail = |e: io::Error| Error::archive_failed(e.to_string());

        // Leaf directory marker first, mirroring what listing the archive
        // with an external tar shows as `<leaf>/`.
        tar.append_dir(leaf, source_tree).map_err(fail)?;
        let mut count = 1;

        for rel in dirs {
            tar.append_dir(leaf.join(rel), source_tree.join(rel))
                .map_err(fail)?;
            count += 1;
        }
        for rel in files {
            tar.append_path_with_name(source_tree.join(rel), leaf.join(rel))
                .map_err(fail)?;
            count += 1;
        }

        let encoder = tar.into_inner().map_err(fail)?;
        let out = encoder.finish().map_err(fail)?;
        out.sync_all().map_err(fail)?;

        Ok(count)
    }
}

/// SHA-256 of a file, hex encoded.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
