//! File discovery for catpack
//!
//! This crate turns a name-or-glob pattern and a list of search roots into
//! the ordered set of files to merge:
//! - Glob compilation (gitignore-style, matched against file names)
//! - Directory traversal, flat or recursive
//! - Root-ordered `FileSet` assembly with ambiguity checks

pub mod fileset;
pub mod pattern;
pub mod resolve;

pub use fileset::FileSet;
pub use pattern::NamePattern;
pub use resolve::{resolve, Resolver};
