//! # simple-backup-core
//!
//! Core library for the simple-backup CLI providing:
//! - Settings resolution from the backuprc file and environment overrides
//! - The fixed-width backup timestamp type
//! - Error types shared by the archive engine and the CLI

pub mod error;
pub mod settings;
pub mod stamp;

pub use error::{Error, Result};
pub use settings::Settings;
pub use stamp::BackupStamp;
