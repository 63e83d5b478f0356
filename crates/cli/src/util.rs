//! Shared utilities for CLI commands

use catpack_core::{ErrorKind, PackError};

/// Format byte size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Interpret `\n`, `\r`, `\t`, `\0` and `\\` in a separator typed on the command line
///
/// Any other backslash sequence is kept as written.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Render a separator for display (`\n` shown as an escape)
pub fn escape(input: &str) -> String {
    input.escape_default().to_string()
}

/// Process exit code for a failed command
///
/// Looks for a `PackError` anywhere in the error chain; anything else is 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<PackError>())
        .map(PackError::kind);

    match kind {
        Some(ErrorKind::NotFound) => 2,
        Some(ErrorKind::MultipleMatches) => 3,
        Some(ErrorKind::InvalidPath | ErrorKind::InvalidPattern | ErrorKind::InvalidSeparator) => 4,
        Some(ErrorKind::Io) => 5,
        Some(ErrorKind::Decode) => 6,
        Some(ErrorKind::Integrity) => 7,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"\n\n"), "\n\n");
        assert_eq!(unescape(r"--\t--"), "--\t--");
        assert_eq!(unescape(r"a\\n"), "a\\n");
        assert_eq!(unescape(r"\x"), "\\x");
        assert_eq!(unescape("trailing\\"), "trailing\\");
        assert_eq!(unescape("plain"), "plain");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("\n\n"), "\\n\\n");
        assert_eq!(escape("----"), "----");
    }

    #[test]
    fn test_exit_code_through_context() {
        let err = Err::<(), _>(PackError::InvalidPath(PathBuf::from("x")))
            .context("Failed to pack")
            .unwrap_err();
        assert_eq!(exit_code(&err), 4);

        let err = anyhow::Error::from(PackError::NotFound("kafka.txt".into()));
        assert_eq!(exit_code(&err), 2);

        assert_eq!(exit_code(&anyhow::anyhow!("plain failure")), 1);
    }
}
