//! Subcommand handlers for the stepslice binary

pub mod batch;
pub mod config;
pub mod jobs;
pub mod segment;
