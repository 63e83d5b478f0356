//! Ordered set of files to merge

use crate::resolve::Resolver;
use catpack_core::{PackError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files to merge, in merge order
///
/// Built from the matches in the primary root followed by the matches in each
/// additional root, in the order the roots were supplied. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<PathBuf>,
}

impl FileSet {
    /// Locate `pattern` in `primary` and then in every root of `extra`
    ///
    /// With `merge_all` each root is walked recursively and any number of
    /// matches is accepted; without it a root is searched one level deep and
    /// more than one match in a single root is `MultipleMatches`. A missing
    /// root is `InvalidPath`; no match anywhere is `NotFound`.
    pub fn collect<P: AsRef<Path>>(
        pattern: &str,
        primary: &Path,
        extra: &[P],
        merge_all: bool,
    ) -> Result<Self> {
        let resolver = Resolver::new(pattern, merge_all)?;
        let mut files = Vec::new();

        let mut roots: Vec<&Path> = Vec::with_capacity(extra.len() + 1);
        roots.push(primary);
        roots.extend(extra.iter().map(|p| p.as_ref()));

        for root in roots {
            let found = resolver.resolve(root)?;
            if found.len() > 1 && !merge_all {
                return Err(PackError::MultipleMatches {
                    root: root.to_path_buf(),
                    count: found.len(),
                });
            }
            debug!(root = %root.display(), matches = found.len(), "Collected root");
            files.extend(found);
        }

        if files.is_empty() {
            return Err(PackError::NotFound(format!(
                "no file with name \"{}\" was found at any of the provided directories",
                resolver.pattern()
            )));
        }

        info!(
            pattern = resolver.pattern(),
            roots = extra.len() + 1,
            files = files.len(),
            "Collected file set"
        );
        Ok(Self { files })
    }

    /// Use an explicit list of paths, in the given order
    pub fn from_paths(files: Vec<PathBuf>) -> Result<Self> {
        if files.is_empty() {
            return Err(PackError::NotFound("empty file list".to_string()));
        }
        Ok(Self { files })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.files.iter()
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.files
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
