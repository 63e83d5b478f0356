//! catpack - merge files in order into an integrity-checked container

use anyhow::Result;
use catpack_cli::cmd::{self, pack::PackArgs};
use catpack_cli::{config, logging, util, Config};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;

/// catpack - Merge same-named files into one verified container
#[derive(Parser)]
#[command(name = "catpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/catpack/config.toml)
    #[arg(long = "config", value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find files by name or glob and merge them into a container
    Pack {
        /// File name or glob matched against file names
        pattern: String,

        /// Additional directories searched after the current one, in order
        paths: Vec<PathBuf>,

        /// Container file to write
        #[arg(short, long)]
        output: PathBuf,

        /// Text placed between files (\n, \t and \\ are interpreted)
        #[arg(short, long)]
        separator: Option<String>,

        /// Accept several matches per directory and search recursively
        #[arg(short = 'a', long = "all", overrides_with = "no_merge_all")]
        merge_all: bool,

        /// One match per directory, top level only (overrides the config file)
        #[arg(long = "no-all")]
        no_merge_all: bool,

        /// Reader threads (0 = one per CPU)
        #[arg(short = 'j', long)]
        workers: Option<usize>,
    },
    /// Verify a container and print its content
    Unpack {
        /// Container file
        file: PathBuf,

        /// Print the content only, without the separator line
        #[arg(long)]
        content_only: bool,
    },
    /// Verify a container's content hash
    Verify {
        /// Container file
        file: PathBuf,
    },
    /// Show configuration
    Config {
        /// Print the default config file path
        #[arg(long, conflicts_with = "example")]
        path: bool,

        /// Print an example config file
        #[arg(long)]
        example: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(util::exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config: Config = config::load(cli.config_file.as_deref())?;
    logging::init(logging::effective_level(
        config.level_filter()?,
        cli.verbose,
        cli.quiet,
    ));

    match cli.command {
        Commands::Pack {
            pattern,
            paths,
            output,
            separator,
            merge_all,
            no_merge_all,
            workers,
        } => {
            let merge_all = match (merge_all, no_merge_all) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let args = PackArgs {
                pattern,
                paths,
                output,
                separator,
                merge_all,
                workers,
            };
            cmd::pack::run(args, &config)
        }
        Commands::Unpack { file, content_only } => cmd::unpack::run(&file, content_only),
        Commands::Verify { file } => cmd::verify::run(&file),
        Commands::Config { path, example } => {
            if path {
                cmd::config::run_path()
            } else if example {
                cmd::config::run_example()
            } else {
                cmd::config::run_list(&config)
            }
        }
    }
}
