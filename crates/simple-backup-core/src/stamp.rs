//! The backup run timestamp.
//!
//! Stamps are fixed-width (`YYYYmmdd-HHMMSS`, UTC, zero padded) so that the
//! lexical order of archive filenames equals their chronological order. The
//! retention pruner and the archive namer both rely on this.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Format string for the on-disk stamp representation.
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// The identity stamp of one backup run, at seconds resolution.
///
/// Embedded in archive filenames and persisted in last-backup records.
/// Two invocations with the same stamp produce colliding archive names;
/// the stamp is the uniqueness key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackupStamp(DateTime<Utc>);

impl BackupStamp {
    /// The current wall-clock time, truncated to whole seconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Builds a stamp from a datetime, truncating sub-second precision.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(DateTime::from_timestamp(dt.timestamp(), 0).expect("timestamp in representable range"))
    }

    /// Parses the fixed-width `YYYYmmdd-HHMMSS` form. Trailing input is
    /// rejected so archive-name parsing stays strict.
    pub fn parse(s: &str) -> Result<Self> {
        let naive = NaiveDateTime::parse_from_str(s, STAMP_FORMAT)
            .map_err(|_| Error::invalid_stamp(s))?;
        Ok(Self(naive.and_utc()))
    }

    /// The stamp as a UTC datetime, for age arithmetic.
    pub fn datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for BackupStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(STAMP_FORMAT))
    }
}

impl FromStr for BackupStamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
