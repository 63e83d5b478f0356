//! CLI command implementations

pub mod config;
pub mod pack;
pub mod unpack;
pub mod verify;
