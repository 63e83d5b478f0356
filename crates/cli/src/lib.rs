//! Catpack CLI library
//!
//! Wires file discovery, ordered merging and the container format into the
//! `catpack` command:
//! - `Exporter` pipeline (pattern + roots -> container)
//! - Configuration file loading
//! - Logging setup
//! - Command implementations

pub mod cmd;
pub mod config;
pub mod export;
pub mod logging;
pub mod util;

pub use config::Config;
pub use export::{ExportReport, Exporter};
