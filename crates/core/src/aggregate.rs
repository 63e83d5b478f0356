//! Ordered concurrent file aggregation
//!
//! Every file is read on a worker thread, but contents are appended to the
//! shared output strictly in input order. A turn token (mutex + condvar)
//! tracks the next index allowed to append; the lock is held only to check
//! the turn and to append, never across the read itself.
//!
//! Workers pull indices from a FIFO queue in increasing order, so the lowest
//! index that has not yet appended is always owned by a running worker and
//! the chain of turns cannot stall on a task that was never scheduled.

use crate::document::MergedDocument;
use crate::error::PackError;
use crate::Result;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::fs::File;
use std::io::{BufReader, Read};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How a single file is turned into newline-terminated text
pub trait LineSource: Sync {
    /// Read `path` and return its lines, each terminated by `\n`
    fn read_lines(&self, path: &Path) -> std::io::Result<String>;
}

/// Reads files from the local filesystem as UTF-8
///
/// `\n`, `\r\n` and a lone `\r` each end a line; every line is stored with a
/// `\n` terminator, so the last line gains one if it had none.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl LineSource for FsSource {
    fn read_lines(&self, path: &Path) -> std::io::Result<String> {
        let file = File::open(path)?;
        let len = file.metadata().map(|m| m.len() as usize).unwrap_or(0);

        let mut raw = String::with_capacity(len);
        BufReader::new(file).read_to_string(&mut raw)?;
        Ok(normalize_lines(&raw))
    }
}

/// Re-terminate every line of `raw` with `\n`
pub fn normalize_lines(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len() + 1);
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                text.push('\n');
            }
            other => text.push(other),
        }
    }
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

/// Merges files concurrently while preserving their input order
pub struct Aggregator<S = FsSource> {
    source: S,
    workers: Option<usize>,
}

impl Aggregator<FsSource> {
    /// Aggregator reading from the filesystem with one worker per CPU
    pub fn new() -> Self {
        Self::with_source(FsSource)
    }
}

impl Default for Aggregator<FsSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LineSource> Aggregator<S> {
    /// Aggregator reading through a custom source
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            workers: None,
        }
    }

    /// Bound the number of worker threads (0 means available parallelism)
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 { None } else { Some(workers) };
        self
    }

    /// Merge `files` in order, placing `separator` between consecutive files
    ///
    /// Fails with `NotFound` for an empty list and with `InvalidSeparator`
    /// when more than one file is given with an empty separator; both checks
    /// happen before any file is opened. If any file cannot be read the whole
    /// merge fails with the error of the lowest failing index.
    pub fn merge<P>(&self, files: &[P], separator: &str) -> Result<MergedDocument>
    where
        P: AsRef<Path> + Sync,
    {
        if files.is_empty() {
            return Err(PackError::NotFound("no files to merge".to_string()));
        }
        if files.len() > 1 && separator.is_empty() {
            return Err(PackError::InvalidSeparator);
        }

        let started = Instant::now();
        let workers = self.worker_count(files.len());
        debug!(files = files.len(), workers, "Starting ordered merge");

        let token = TurnToken::new();
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
        for index in 0..files.len() {
            // Receiver is alive for the whole loop
            let _ = job_tx.send(index);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let jobs = job_rx.clone();
                let token = &token;
                scope.spawn(move || {
                    let _guard = PoisonOnPanic(token);
                    for index in jobs.iter() {
                        self.run_task(token, files, index, separator);
                    }
                });
            }
        });

        let state = token.into_inner();
        if let Some((index, err)) = state.failure {
            warn!(index, error = %err, "Merge aborted");
            return Err(err);
        }

        info!(
            files = files.len(),
            bytes = state.output.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Merged files"
        );

        let separator = (files.len() > 1).then(|| separator.to_string());
        Ok(MergedDocument::new(separator, state.output))
    }

    fn worker_count(&self, files: usize) -> usize {
        let wanted = self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        });
        wanted.clamp(1, files)
    }

    /// Read one file, wait for its turn, append it
    fn run_task<P: AsRef<Path>>(
        &self,
        token: &TurnToken,
        files: &[P],
        index: usize,
        separator: &str,
    ) {
        if token.failed_before(index) {
            return;
        }

        let path = files[index].as_ref();
        let text = match self.source.read_lines(path) {
            Ok(text) => text,
            Err(e) => {
                debug!(index, path = %path.display(), error = %e, "Failed to read file");
                token.fail(index, PackError::io(path, e));
                return;
            }
        };

        let Some(mut state) = token.wait_for_turn(index) else {
            return;
        };
        state.output.push_str(&text);
        if index + 1 < files.len() {
            state.output.push_str(separator);
        }
        state.next += 1;
        drop(state);
        token.turn.notify_all();

        debug!(index, path = %path.display(), bytes = text.len(), "Appended file");
    }
}

/// Merge with a default [`Aggregator`]
pub fn merge<P>(files: &[P], separator: &str) -> Result<MergedDocument>
where
    P: AsRef<Path> + Sync,
{
    Aggregator::new().merge(files, separator)
}

/// Shared state guarded by the turn token
struct TurnState {
    /// Index allowed to append next
    next: usize,
    /// Merged output so far
    output: String,
    /// Lowest-index failure seen; set means poisoned
    failure: Option<(usize, PackError)>,
}

struct TurnToken {
    state: Mutex<TurnState>,
    turn: Condvar,
}

impl TurnToken {
    fn new() -> Self {
        Self {
            state: Mutex::new(TurnState {
                next: 0,
                output: String::new(),
                failure: None,
            }),
            turn: Condvar::new(),
        }
    }

    /// Block until `index` may append; `None` once the merge has failed
    fn wait_for_turn(&self, index: usize) -> Option<MutexGuard<'_, TurnState>> {
        let mut state = self.state.lock();
        loop {
            if state.failure.is_some() {
                return None;
            }
            if state.next == index {
                return Some(state);
            }
            self.turn.wait(&mut state);
        }
    }

    /// A lower index already failed, so this task's outcome cannot matter
    fn failed_before(&self, index: usize) -> bool {
        matches!(self.state.lock().failure, Some((failed, _)) if failed < index)
    }

    /// Record a failure and release every waiter
    fn fail(&self, index: usize, err: PackError) {
        let mut state = self.state.lock();
        match state.failure {
            Some((failed, _)) if failed <= index => {}
            _ => state.failure = Some((index, err)),
        }
        drop(state);
        self.turn.notify_all();
    }

    fn into_inner(self) -> TurnState {
        self.state.into_inner()
    }
}

/// Poisons the token if a worker unwinds, so no waiter blocks forever
struct PoisonOnPanic<'a>(&'a TurnToken);

impl Drop for PoisonOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let err = std::io::Error::new(std::io::ErrorKind::Other, "worker panicked");
            self.0.fail(usize::MAX, PackError::io("<worker>", err));
        }
    }
}
