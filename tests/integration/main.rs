//! Integration tests for stepslice

mod batch_test;
mod cli_test;
mod filename_test;
mod helpers;
mod segment_test;
mod workflow_test;
