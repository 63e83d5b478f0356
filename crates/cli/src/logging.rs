//! Tracing subscriber setup

use tracing::level_filters::LevelFilter;

/// Pick the effective level from config and `-v`/`-q` flags
///
/// `quiet` wins. Each `-v` raises the configured level by one step.
pub fn effective_level(configured: LevelFilter, verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    let ladder = [
        LevelFilter::OFF,
        LevelFilter::ERROR,
        LevelFilter::WARN,
        LevelFilter::INFO,
        LevelFilter::DEBUG,
        LevelFilter::TRACE,
    ];
    let start = ladder.iter().position(|l| *l == configured).unwrap_or(2);
    let index = (start + verbose as usize).min(ladder.len() - 1);
    ladder[index]
}

/// Install the global subscriber, writing to stderr
///
/// Stdout stays reserved for command output (`unpack` prints content there).
pub fn init(level: LevelFilter) {
    // A second init (tests) is harmless; keep the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
