//! Archive naming.
//!
//! On-disk archive names are `<name>-<tag>-<stamp>.tar.gz`, where the tag
//! identifies the archive family (`fs` for filesystem trees, `db` for
//! database dumps) and the stamp is the fixed-width run timestamp. Because
//! the stamp is fixed width, sorting names lexically sorts them
//! chronologically, which the retention pruner relies on.

use simple_backup_core::BackupStamp;
use std::fmt;
use std::path::PathBuf;

/// Suffix shared by every archive this tool produces.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// The archive family encoded in the filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// A filesystem tree archive
    Filesystem,

    /// A database dump archive
    Database,
}

impl ArchiveKind {
    /// The tag embedded in filenames.
    pub fn tag(&self) -> &'static str {
        match self {
            ArchiveKind::Filesystem => "fs",
            ArchiveKind::Database => "db",
        }
    }

    /// All known kinds, in parse-priority order.
    pub fn all() -> [ArchiveKind; 2] {
        [ArchiveKind::Filesystem, ArchiveKind::Database]
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// One archive on disk, identified by its parsed name.
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    /// Archive family
    pub kind: ArchiveKind,

    /// Logical backup name
    pub name: String,

    /// Run stamp embedded in the filename
    pub stamp: BackupStamp,

    /// Physical location
    pub path: PathBuf,
}

/// Builds the canonical archive filename for a kind/name/stamp triple.
pub fn file_name(kind: ArchiveKind, logical_name: &str, stamp: &BackupStamp) -> String {
    format!("{}-{}-{}{}", logical_name, kind.tag(), stamp, ARCHIVE_SUFFIX)
}

/// Parses a filename back into its kind and stamp.
///
/// Returns `None` for anything that is not an archive of `logical_name`:
/// foreign files, renamed archives, and the last-backup record all fall
/// through here, which is what keeps the pruner away from them.
pub fn parse(file_name: &str, logical_name: &str) -> Option<(ArchiveKind, BackupStamp)> {
    let stem = file_name.strip_suffix(ARCHIVE_SUFFIX)?;
    let rest = stem.strip_prefix(logical_name)?.strip_prefix('-')?;
    for kind in ArchiveKind::all() {
        if let Some(raw) = rest.strip_prefix(kind.tag()).and_then(|r| r.strip_prefix('-')) {
            if let Ok(stamp) = BackupStamp::parse(raw) {
                return Some((kind, stamp));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(s: &str) -> BackupStamp {
        BackupStamp::parse(s).unwrap()
    }

    #[test]
    fn test_file_name_shape() {
        let name = file_name(ArchiveKind::Filesystem, "backup_name", &stamp("20260101-120000"));
        assert_eq!(name, "backup_name-fs-20260101-120000.tar.gz");

        let name = file_name(ArchiveKind::Database, "backup_name", &stamp("20260101-120000"));
        assert_eq!(name, "backup_name-db-20260101-120000.tar.gz");
    }

    #[test]
    fn test_round_trip_both_kinds() {
        let s = stamp("20251224-061530");
        for kind in ArchiveKind::all() {
            let name = file_name(kind, "nightly", &s);
            let (parsed_kind, parsed_stamp) = parse(&name, "nightly").unwrap();
            assert_eq!(parsed_kind, kind);
            assert_eq!(parsed_stamp, s);
        }
    }

    #[test]
    fn test_parse_rejects_foreign_files() {
        assert!(parse("last_backup", "nightly").is_none());
        assert!(parse("1.tar.gz", "nightly").is_none());
        assert!(parse("nightly-fs-garbage.tar.gz", "nightly").is_none());
        assert!(parse("nightly-xx-20260101-120000.tar.gz", "nightly").is_none());
        assert!(parse("other-fs-20260101-120000.tar.gz", "nightly").is_none());
        assert!(parse("nightly-fs-20260101-120000.tar", "nightly").is_none());
    }

    #[test]
    fn test_parse_rejects_trailing_garbage_in_stamp() {
        assert!(parse("nightly-fs-20260101-120000x.tar.gz", "nightly").is_none());
    }

    #[test]
    fn test_lexical_sort_is_chronological() {
        let stamps = ["20250103-000000", "20251231-235959", "20260101-000000"];
        let names: Vec<String> = stamps
            .iter()
            .map(|s| file_name(ArchiveKind::Filesystem, "nightly", &stamp(s)))
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, names);
    }

    #[test]
    fn test_logical_name_containing_hyphens() {
        let s = stamp("20260101-120000");
        let name = file_name(ArchiveKind::Filesystem, "my-laptop-home", &s);
        let (kind, parsed) = parse(&name, "my-laptop-home").unwrap();
        assert_eq!(kind, ArchiveKind::Filesystem);
        assert_eq!(parsed, s);
    }
}
