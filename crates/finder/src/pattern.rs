//! Name-or-glob patterns matched against file names
//!
//! Patterns use gitignore glob syntax via the `ignore` crate:
//! `*` and `?` wildcards, `[abc]` classes, `{a,b}` alternation.
//! A plain name matches only that exact file name.

use catpack_core::{PackError, Result};
use ignore::overrides::{Override, OverrideBuilder};
use std::path::Path;

/// A compiled file name pattern
pub struct NamePattern {
    source: String,
    matcher: Override,
}

impl NamePattern {
    /// Compile `pattern`
    ///
    /// Fails with `InvalidPattern` when the pattern is empty, contains a
    /// path separator, is a negation, or is not a valid glob.
    pub fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(PackError::InvalidPattern("The provided glob is empty".to_string()));
        }
        if trimmed.starts_with('!') {
            return Err(PackError::InvalidPattern(format!(
                "negated patterns are not supported: {}",
                pattern
            )));
        }
        if trimmed.contains('/') || trimmed.contains('\\') {
            return Err(PackError::InvalidPattern(format!(
                "pattern must match a file name, not a path: {}",
                pattern
            )));
        }

        // Override globs are relative to a root; file names are matched bare.
        // A leading `#` would make the line a gitignore comment.
        let glob = match trimmed.strip_prefix('#') {
            Some(rest) => format!("\\#{}", rest),
            None => trimmed.to_string(),
        };
        let mut builder = OverrideBuilder::new("");
        builder
            .add(&glob)
            .map_err(|e| PackError::InvalidPattern(format!("{}: {}", pattern, e)))?;
        let matcher = builder
            .build()
            .map_err(|e| PackError::InvalidPattern(format!("{}: {}", pattern, e)))?;

        Ok(Self {
            source: trimmed.to_string(),
            matcher,
        })
    }

    /// Check whether `file_name` (a bare name, no directories) matches
    pub fn matches(&self, file_name: &Path) -> bool {
        self.matcher.matched(file_name, false).is_whitelist()
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for NamePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("NamePattern").field(&self.source).finish()
    }
}
