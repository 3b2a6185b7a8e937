//! Step identifier derivation.
//!
//! The runner echoes a header line when a step starts: the first line of a
//! shell script, the action reference, or the declared name. The identifier
//! reproduces that header so it can be searched for in the log.

use super::config::SegmentationConfig;
use crate::workflow::StepSpec;

/// Characters YAML uses to introduce literal and folded block scalars.
const BLOCK_SCALAR_MARKERS: &[char] = &['|', '>'];

/// Derive the identifier for one step.
///
/// Priority: `run` (first line) > `uses` > `name` > placeholder. A `run`
/// whose first line is blank yields the placeholder; it does not fall
/// through to `uses` or `name`. A blank `uses` or `name` counts as absent.
pub fn derive_identifier(spec: &StepSpec, config: &SegmentationConfig) -> String {
    if let Some(run) = &spec.run {
        return match first_command_line(run) {
            Some(first) => format!("{}{}", config.identifier_prefix, first),
            None => config.placeholder_identifier.clone(),
        };
    }
    if let Some(uses) = non_blank(spec.uses.as_deref()) {
        return format!("{}{}", config.identifier_prefix, uses);
    }
    if let Some(name) = non_blank(spec.name.as_deref()) {
        return format!("{}{}", config.identifier_prefix, name);
    }
    config.placeholder_identifier.clone()
}

/// First line of a script, without a leading block scalar marker.
fn first_command_line(script: &str) -> Option<&str> {
    let first = script.lines().next()?;
    let stripped = first
        .trim_start()
        .trim_start_matches(BLOCK_SCALAR_MARKERS)
        .trim();
    (!stripped.is_empty()).then_some(stripped)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
