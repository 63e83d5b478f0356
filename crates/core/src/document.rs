//! In-memory result of a merge

/// Merged text plus the separator placed between source files
///
/// `separator` is `None` when exactly one file was merged, since there is
/// no boundary to mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocument {
    pub separator: Option<String>,
    pub content: String,
}

impl MergedDocument {
    pub fn new(separator: Option<String>, content: String) -> Self {
        Self { separator, content }
    }

    /// Split the content back into per-file sections
    ///
    /// Only exact when the separator never occurs inside a file's text.
    pub fn sections(&self) -> Vec<&str> {
        match self.separator.as_deref() {
            Some(sep) if !sep.is_empty() => self.content.split(sep).collect(),
            _ => vec![self.content.as_str()],
        }
    }
}
