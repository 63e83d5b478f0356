//! Read back a container

use crate::util;
use anyhow::{Context, Result};
use catpack_core::container;
use std::io::Write;
use std::path::Path;

/// Verify `file` and print its separator and content
///
/// Nothing is printed unless verification succeeds.
pub fn run(file: &Path, content_only: bool) -> Result<()> {
    let doc = container::read(file)
        .with_context(|| format!("Failed to unpack {}", file.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if !content_only {
        match &doc.separator {
            Some(sep) => writeln!(out, "separator: \"{}\"", util::escape(sep))?,
            None => writeln!(out, "separator: <none>")?,
        }
    }
    out.write_all(doc.content.as_bytes())?;
    out.flush()?;
    Ok(())
}
