//! Workflow definition errors.

use std::path::PathBuf;

/// Errors that can occur while loading a workflow definition.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Failed to read workflow {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse workflow YAML: {0}")]
    Parse(#[from] yaml_rust2::ScanError),

    #[error("Workflow document is empty")]
    Empty,

    #[error("Invalid workflow at '{location}': expected {expected}")]
    InvalidStructure {
        location: String,
        expected: &'static str,
    },
}

impl WorkflowError {
    pub(crate) fn invalid(location: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidStructure {
            location: location.into(),
            expected,
        }
    }
}
