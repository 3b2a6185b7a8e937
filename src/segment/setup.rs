//! Setup segment detection.
//!
//! Everything the runner prints before the job-name sentinel (runner
//! version, image details, action downloads) belongs to the implicit setup
//! step.

use super::normalize::LogLines;

/// Boundary between the setup output and the steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupSegment {
    /// Line index of the sentinel, or the last line when it is missing
    pub end_line: usize,
    /// Text of the lines strictly before the sentinel
    pub content: String,
    /// First line to search for steps; `None` when the sentinel is missing
    pub search_from: Option<usize>,
}

impl SetupSegment {
    pub fn sentinel_found(&self) -> bool {
        self.search_from.is_some()
    }

    /// Stretch the segment over the whole log, keeping the sentinel state.
    ///
    /// Used when the job declares no steps: nothing else can claim the
    /// lines after the sentinel.
    pub fn covering_whole_log(self, lines: &LogLines) -> Self {
        Self {
            end_line: lines.len().saturating_sub(1),
            content: lines.to_text(),
            ..self
        }
    }
}

/// Locate the sentinel line and split off the setup output.
///
/// Without a sentinel the whole log is setup and no step search happens.
pub fn detect_setup(lines: &LogLines, sentinel: &str) -> SetupSegment {
    match lines.iter().find(|(_, line)| line.contains(sentinel)) {
        Some((index, _)) => SetupSegment {
            end_line: index,
            content: lines.prefix(index),
            search_from: Some(index + 1),
        },
        None => SetupSegment {
            end_line: lines.len().saturating_sub(1),
            content: lines.to_text(),
            search_from: None,
        },
    }
}
