//! Configuration for the segmentation engine.

use serde::{Deserialize, Serialize};

/// Literal the runner prints in front of an echoed step header.
pub const DEFAULT_IDENTIFIER_PREFIX: &str = "Run ";

/// Identifier used when a step gives nothing to match on.
pub const DEFAULT_PLACEHOLDER_IDENTIFIER: &str = "Run Unknown Step";

/// Prefix of the line that closes the runner's job setup output.
pub const DEFAULT_SENTINEL_PREFIX: &str = "Complete job name: ";

/// Configuration for the segmentation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Tag prepended to every derived step identifier
    pub identifier_prefix: String,
    /// Identifier for steps without a usable run/uses/name
    pub placeholder_identifier: String,
    /// Sentinel prefix; the job name is appended to it
    pub sentinel_prefix: String,
    /// Strip the runner's leading ISO-8601 timestamp from each line
    pub strip_timestamps: bool,
}

impl SegmentationConfig {
    /// The full sentinel text for a given job.
    pub fn sentinel_for(&self, job_name: &str) -> String {
        format!("{}{}", self.sentinel_prefix, job_name)
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            identifier_prefix: DEFAULT_IDENTIFIER_PREFIX.to_string(),
            placeholder_identifier: DEFAULT_PLACEHOLDER_IDENTIFIER.to_string(),
            sentinel_prefix: DEFAULT_SENTINEL_PREFIX.to_string(),
            strip_timestamps: false,
        }
    }
}
