//! Error types for simple-backup-core

use thiserror::Error;

/// Result type alias using simple-backup-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for simple-backup.
///
/// Per-file failures during pruning and mirroring are not represented here;
/// they are aggregated into the pass reports and never abort a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {key}")]
    MissingKey { key: String },

    /// Configuration value failed validation
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// Timestamp failed to parse
    #[error("Invalid timestamp: {value} (expected YYYYmmdd-HHMMSS)")]
    InvalidStamp { value: String },

    /// Backup source tree missing or unreadable
    #[error("Source tree unreadable: {path}: {message}")]
    SourceUnreadable { path: String, message: String },

    /// Archive destination missing or unwritable
    #[error("Destination unwritable: {path}: {message}")]
    DestinationUnwritable { path: String, message: String },

    /// Archive creation failed; partial output has been discarded
    #[error("Archive creation failed: {message}")]
    ArchiveFailed { message: String },

    /// Last-backup record update failed
    #[error("Failed to update last-backup record {path}: {message}")]
    TrackerWrite { path: String, message: String },

    /// External command failed
    #[error("Command `{command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a missing key error
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create an invalid timestamp error
    pub fn invalid_stamp(value: impl Into<String>) -> Self {
        Self::InvalidStamp {
            value: value.into(),
        }
    }

    /// Create a source unreadable error
    pub fn source_unreadable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnreadable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a destination unwritable error
    pub fn destination_unwritable(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DestinationUnwritable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an archive failed error
    pub fn archive_failed(message: impl Into<String>) -> Self {
        Self::ArchiveFailed {
            message: message.into(),
        }
    }

    /// Create a tracker write error
    pub fn tracker_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TrackerWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }
}
