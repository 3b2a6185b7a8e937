//! Step records: the output of a segmentation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::locator::Pattern;
use super::normalize::LogLines;
use super::setup::SetupSegment;
use crate::workflow::StepSpec;

/// Display name of the implicit setup record.
pub const SETUP_STEP_NAME: &str = "Set up job";

/// Display name for steps that declare neither `name` nor `uses`.
pub const UNNAMED_STEP: &str = "Unnamed Step";

/// Note attached to steps whose identifier never appears in the log.
pub const NOT_FOUND_NOTE: &str = "Step not found in log";

/// Note attached to steps when the setup sentinel is missing.
pub const NO_SENTINEL_NOTE: &str = "Step not searched: setup sentinel missing from log";

/// Kind of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// Runner output before the first step
    Setup,
    /// A step declared in the workflow
    Action,
}

/// One slice of a job log.
///
/// Unresolved steps have `start_line == end_line == -1`, no content and a
/// `resolution_note`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub uses: Option<String>,
    pub run: Option<String>,
    #[serde(default)]
    pub with: IndexMap<String, String>,
    #[serde(default)]
    pub env: IndexMap<String, String>,
    pub log_content: String,
    /// Set once the content has been moved to a separate artifact
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    pub start_line: i64,
    pub end_line: i64,
    pub matched_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
    pub workflow_code: String,
}

impl StepRecord {
    /// The implicit record covering everything before the sentinel.
    pub fn setup(setup: &SetupSegment) -> Self {
        Self {
            name: SETUP_STEP_NAME.to_string(),
            step_type: StepType::Setup,
            uses: None,
            run: None,
            with: IndexMap::new(),
            env: IndexMap::new(),
            log_content: setup.content.clone(),
            log_file_path: None,
            start_line: 0,
            end_line: to_line(setup.end_line),
            matched_identifier: None,
            resolution_note: None,
            workflow_code: String::new(),
        }
    }

    /// A record for a located step.
    pub fn resolved(pattern: &Pattern<'_>, lines: &LogLines) -> Self {
        let (start, end) = match (pattern.start_line, pattern.end_line) {
            (Some(start), Some(end)) => (start, end),
            _ => return Self::unresolved(pattern, NOT_FOUND_NOTE),
        };
        Self {
            log_content: lines.slice(start, end),
            start_line: to_line(start),
            end_line: to_line(end),
            ..Self::from_spec(pattern)
        }
    }

    /// A record for a step that could not be located.
    pub fn unresolved(pattern: &Pattern<'_>, note: &str) -> Self {
        Self {
            resolution_note: Some(note.to_string()),
            ..Self::from_spec(pattern)
        }
    }

    fn from_spec(pattern: &Pattern<'_>) -> Self {
        let spec = pattern.spec;
        Self {
            name: display_name(spec),
            step_type: StepType::Action,
            uses: spec.uses.clone(),
            run: spec.run.clone(),
            with: spec.with.clone().unwrap_or_default(),
            env: spec.env.clone().unwrap_or_default(),
            log_content: String::new(),
            log_file_path: None,
            start_line: -1,
            end_line: -1,
            matched_identifier: Some(pattern.identifier.clone()),
            resolution_note: None,
            workflow_code: render_workflow_code(spec),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.start_line >= 0
    }

    pub fn is_setup(&self) -> bool {
        self.step_type == StepType::Setup
    }

    /// Number of log lines covered by this record.
    pub fn line_count(&self) -> usize {
        if self.start_line < 0 || self.end_line < self.start_line {
            return 0;
        }
        (self.end_line - self.start_line + 1) as usize
    }
}

fn to_line(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

/// Name shown for a step: its declared name, else its action reference.
pub fn display_name(spec: &StepSpec) -> String {
    if let Some(name) = spec.name.as_deref().filter(|n| !n.trim().is_empty()) {
        return name.to_string();
    }
    match spec.uses.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(uses) => format!("Run {}", uses),
        None => UNNAMED_STEP.to_string(),
    }
}

/// Human-readable rendering of what a step declares.
///
/// Blocks appear in a fixed order (run, uses, name, with, env) and are
/// omitted when the step does not declare them.
pub fn render_workflow_code(spec: &StepSpec) -> String {
    let mut blocks = Vec::new();

    if let Some(run) = &spec.run {
        blocks.push(format!("Run:\n{}", run.trim_end_matches('\n')));
    }
    if let Some(uses) = &spec.uses {
        blocks.push(format!("Uses: {}", uses));
    }
    if let Some(name) = &spec.name {
        blocks.push(format!("Name: {}", name));
    }
    if let Some(with) = &spec.with {
        blocks.push(render_mapping("With:", with));
    }
    if let Some(env) = &spec.env {
        blocks.push(render_mapping("Env:", env));
    }

    blocks.join("\n")
}

fn render_mapping(header: &str, values: &IndexMap<String, String>) -> String {
    let mut out = header.to_string();
    for (key, value) in values {
        out.push_str(&format!("\n  {}: {}", key, value));
    }
    out
}
