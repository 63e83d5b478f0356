//! Catpack Core - ordered file aggregation and integrity-checked containers
//!
//! This crate provides the foundational layer:
//! - SHA-256 content hashing
//! - Ordered concurrent merging of text files
//! - The `CPAK` binary container with hash verification
//! - The shared error taxonomy

pub mod aggregate;
pub mod container;
pub mod document;
pub mod error;
pub mod hash;

// Re-export main types for convenience
pub use aggregate::{Aggregator, FsSource, LineSource};
pub use document::MergedDocument;
pub use error::{ErrorKind, PackError};
pub use hash::ContentHash;

/// Common result type used throughout catpack
pub type Result<T> = std::result::Result<T, PackError>;
