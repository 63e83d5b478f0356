//! Merge matching files into a container

use crate::config::Config;
use crate::export::Exporter;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Options from the command line; `None` falls back to the config file
#[derive(Debug, Clone, Default)]
pub struct PackArgs {
    pub pattern: String,
    pub paths: Vec<PathBuf>,
    pub output: PathBuf,
    pub separator: Option<String>,
    pub merge_all: Option<bool>,
    pub workers: Option<usize>,
}

pub fn run(args: PackArgs, config: &Config) -> Result<()> {
    let separator = args
        .separator
        .as_deref()
        .map(util::unescape)
        .unwrap_or_else(|| config.pack.separator.clone());

    let exporter = Exporter::new(&args.pattern)
        .paths(args.paths.iter().cloned())
        .separator(separator)
        .merge_all(args.merge_all.unwrap_or(config.pack.merge_all))
        .workers(args.workers.unwrap_or(config.pack.workers));

    let report = exporter
        .export(&args.output)
        .with_context(|| format!("Failed to pack '{}'", args.pattern))?;

    println!(
        "{} Packed {} {} into {}",
        "✓".green(),
        report.files.to_string().bold(),
        if report.files == 1 { "file" } else { "files" },
        report.destination.display().to_string().cyan()
    );
    println!("  {} {}", "Hash:     ".dimmed(), report.hash.to_hex().bright_green());
    println!("  {} {}", "Content:  ".dimmed(), util::format_size(report.bytes as u64));
    match &report.separator {
        Some(sep) => println!("  {} \"{}\"", "Separator:".dimmed(), util::escape(sep)),
        None => println!("  {} {}", "Separator:".dimmed(), "<none>".dimmed()),
    }

    Ok(())
}
