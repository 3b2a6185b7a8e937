//! stepslice - split CI job logs into per-step slices
//!
//! A job log from a hosted CI runner is one undifferentiated text stream.
//! Given the workflow definition that produced it, this crate attributes
//! each line to the workflow step that emitted it.

pub mod batch;
pub mod config;
pub mod files;
pub mod logging;
pub mod segment;
pub mod workflow;

pub use batch::{BatchReport, BatchRunner, JobInput, WorkflowCache};
pub use config::Config;
pub use files::ArtifactWriter;
pub use segment::{Segmentation, Segmenter, StepRecord};
pub use workflow::{StepSpec, WorkflowDefinition};
