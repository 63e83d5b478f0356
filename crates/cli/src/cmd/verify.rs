//! Check a container's integrity without printing its content

use anyhow::{Context, Result};
use catpack_core::container;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn run(file: &Path) -> Result<()> {
    let container = container::open(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let hash = container.hash;

    container
        .verify()
        .with_context(|| format!("Verification failed for {}", file.display()))?;

    println!("{} {} {}", "OK".green().bold(), hash.to_hex(), file.display());
    Ok(())
}
