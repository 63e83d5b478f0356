//! Directory traversal for pattern matches

use crate::pattern::NamePattern;
use catpack_core::{PackError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Resolves one compiled pattern against any number of roots
#[derive(Debug)]
pub struct Resolver {
    pattern: NamePattern,
    recursive: bool,
}

impl Resolver {
    /// Compile `pattern`; `recursive` walks every level below each root
    pub fn new(pattern: &str, recursive: bool) -> Result<Self> {
        Ok(Self {
            pattern: NamePattern::new(pattern)?,
            recursive,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Regular files under `root` whose name matches, sorted by path
    ///
    /// Symbolic links are followed. Without recursion only the direct
    /// children of `root` are considered.
    pub fn resolve(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(PackError::InvalidPath(root.to_path_buf()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut matches = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| walk_error(root, e))?;

            // Only regular files (after following links)
            if !entry.file_type().is_file() {
                continue;
            }

            if self.pattern.matches(Path::new(entry.file_name())) {
                matches.push(entry.into_path());
            }
        }

        matches.sort();
        debug!(
            root = %root.display(),
            pattern = self.pattern.as_str(),
            matches = matches.len(),
            "Resolved pattern"
        );
        Ok(matches)
    }
}

/// Resolve `pattern` under `root` in one call
pub fn resolve(root: &Path, pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    Resolver::new(pattern, recursive)?.resolve(root)
}

fn walk_error(root: &Path, err: walkdir::Error) -> PackError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message));
    PackError::Io { path, source }
}
