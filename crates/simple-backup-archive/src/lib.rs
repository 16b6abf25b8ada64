//! # simple-backup-archive
//!
//! The backup engine behind the simple-backup CLI:
//!
//! - **Planner**: full vs incremental decision from history, weekday, and
//!   the force flag
//! - **Namer**: deterministic `<name>-<tag>-<stamp>.tar.gz` filenames whose
//!   lexical order is chronological
//! - **Archiver**: streaming tar+gzip of the source tree with glob
//!   exclusions and an mtime-based incremental cut
//! - **Pruner**: retention passes that delete archives past their window
//!   and nothing else
//! - **Syncer**: additive mirroring of one archive tree into another
//! - **Notifier**: the staleness decision behind the check exit status
//! - **Tracker**: the crash-safe last-backup record per tree
//!
//! The file system is the single source of truth; nothing is cached across
//! invocations. Concurrent invocations against one archive tree are the
//! caller's responsibility to serialize.

pub mod archive;
pub mod dump;
pub mod filters;
pub mod naming;
pub mod notify;
pub mod planner;
pub mod prune;
pub mod sync;
pub mod tracker;

// Re-export commonly used types
pub use archive::{ArchiveOptions, ArchiveOutcome, ArchiveWriter, DEFAULT_COMPRESSION_LEVEL};
pub use dump::{dump_database, DumpOutcome};
pub use filters::ExclusionSet;
pub use naming::{ArchiveFile, ArchiveKind, ARCHIVE_SUFFIX};
pub use notify::should_notify;
pub use planner::{plan, BackupMode};
pub use prune::{prune, PruneReport};
pub use sync::{sync, SyncReport};
pub use tracker::LastBackupTracker;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
