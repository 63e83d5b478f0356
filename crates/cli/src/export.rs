//! Pattern-to-container pipeline

use catpack_core::{container, Aggregator, ContentHash, MergedDocument, Result};
use catpack_finder::FileSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// Separator placed between files when none is configured
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// Finds files by name or glob, merges them, and writes a container
///
/// ```no_run
/// use catpack_cli::Exporter;
/// use std::path::Path;
///
/// let report = Exporter::new("kafka.txt")
///     .paths(["dirs/d0", "dirs/d1"])
///     .merge_all(true)
///     .export(Path::new("kafka.otxt"))?;
/// println!("{} files, hash {}", report.files, report.hash);
/// # Ok::<(), catpack_core::PackError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Exporter {
    pattern: String,
    paths: Vec<PathBuf>,
    working_dir: PathBuf,
    separator: String,
    merge_all: bool,
    workers: usize,
}

/// Summary of a finished export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub files: usize,
    pub bytes: usize,
    pub separator: Option<String>,
    pub hash: ContentHash,
    pub destination: PathBuf,
}

impl Exporter {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            paths: Vec::new(),
            working_dir: PathBuf::from("."),
            separator: DEFAULT_SEPARATOR.to_string(),
            merge_all: false,
            workers: 0,
        }
    }

    /// Add one search root after the working directory
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    /// Add several search roots, keeping their order
    pub fn paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Primary search root (default: `.`)
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Accept several matches per root and search roots recursively
    pub fn merge_all(mut self, merge_all: bool) -> Self {
        self.merge_all = merge_all;
        self
    }

    /// Worker thread bound for reading (0 = available parallelism)
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Resolve the files that would be merged
    pub fn collect(&self) -> Result<FileSet> {
        FileSet::collect(&self.pattern, &self.working_dir, &self.paths, self.merge_all)
    }

    /// Locate and merge the files
    pub fn read_source(&self) -> Result<MergedDocument> {
        self.collect_and_merge().map(|(_, doc)| doc)
    }

    /// Locate, merge, and write the result to `destination`
    pub fn export(&self, destination: &Path) -> Result<ExportReport> {
        let (files, doc) = self.collect_and_merge()?;
        let hash = container::write(&doc, destination)?;

        info!(
            pattern = %self.pattern,
            files = files.len(),
            destination = %destination.display(),
            "Exported container"
        );

        Ok(ExportReport {
            files: files.len(),
            bytes: doc.content.len(),
            separator: doc.separator,
            hash,
            destination: destination.to_path_buf(),
        })
    }

    fn collect_and_merge(&self) -> Result<(FileSet, MergedDocument)> {
        let files = self.collect()?;
        let doc = Aggregator::new()
            .workers(self.workers)
            .merge(files.paths(), &self.separator)?;
        Ok((files, doc))
    }
}
