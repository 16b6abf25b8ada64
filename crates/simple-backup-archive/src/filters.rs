//! Exclusion filtering for archive runs.
//!
//! Patterns come from a newline-delimited exclude file. A path is excluded
//! when any of its components or its full tree-relative path matches a
//! pattern, so a bare `tmp` line keeps every `tmp` directory, anywhere in
//! the tree, out of the archive together with its subtree.

use globset::{Glob, GlobSet, GlobSetBuilder};
use simple_backup_core::{Error, Result};
use std::fs;
use std::path::Path;

/// Compiled exclusion patterns for one archive run.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    /// The compiled globset used for matching
    globset: GlobSet,

    /// Source patterns, for diagnostics
    patterns: Vec<String>,
}

impl ExclusionSet {
    /// An exclusion set that matches nothing.
    pub fn empty() -> Self {
        Self {
            globset: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    /// Compiles a set from raw patterns.
    ///
    /// Each pattern `p` is expanded to also match as a path component
    /// (`**/p`) and as a directory subtree (`p/**`, `**/p/**`).
    pub fn from_patterns<I, S>(raw: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut patterns = Vec::new();

        for raw in raw {
            let pattern = raw.as_ref().trim().trim_end_matches('/');
            if pattern.is_empty() || pattern.starts_with('#') {
                continue;
            }

            for variant in [
                pattern.to_string(),
                format!("{pattern}/**"),
                format!("**/{pattern}"),
                format!("**/{pattern}/**"),
            ] {
                let glob = Glob::new(&variant).map_err(|e| {
                    Error::invalid_config(format!("invalid exclusion pattern '{pattern}': {e}"))
                })?;
                builder.add(glob);
            }
            patterns.push(pattern.to_string());
        }

        let globset = builder
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to build exclusion set: {e}")))?;

        Ok(Self { globset, patterns })
    }

    /// Reads patterns from an exclude file. A missing file is an empty set;
    /// first runs commonly have none.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no exclude file, matching nothing");
                return Ok(Self::empty());
            }
            Err(e) => return Err(Error::Io(e)),
        };
        Self::from_patterns(content.lines())
    }

    /// True when the tree-relative path matches any pattern.
    pub fn is_match(&self, relative: &Path) -> bool {
        self.globset.is_match(relative)
    }

    /// Number of source patterns in the set.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when the set matches nothing.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The source patterns, as read.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}
