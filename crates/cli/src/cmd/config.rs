//! Configuration inspection command

use crate::config::{self, Config};
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// Print the effective configuration
pub fn run_list(config: &Config) -> Result<()> {
    let location = config::config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(no config directory)".to_string());

    println!("{}", "Configuration".bold());
    println!("{}: {}\n", "Default location".dimmed(), location.dimmed());

    println!("{}", "[pack]".yellow());
    println!(
        "  {} = \"{}\"",
        "separator".cyan(),
        util::escape(&config.pack.separator)
    );
    println!("  {} = {}", "merge_all".cyan(), config.pack.merge_all);
    println!(
        "  {} = {} {}",
        "workers".cyan(),
        config.pack.workers,
        if config.pack.workers == 0 {
            "(one per CPU)".dimmed().to_string()
        } else {
            String::new()
        }
    );

    println!("\n{}", "[logging]".yellow());
    println!("  {} = \"{}\"", "level".cyan(), config.logging.level);

    Ok(())
}

/// Show the default config file path
pub fn run_path() -> Result<()> {
    let path = config::config_file_path().context("Could not determine config file path")?;

    println!("{}", path.display());
    if !path.exists() {
        println!("{}", "File does not exist; built-in defaults are used.".yellow());
    }
    Ok(())
}

/// Show example configuration
pub fn run_example() -> Result<()> {
    print!("{}", config::example_config());
    Ok(())
}
