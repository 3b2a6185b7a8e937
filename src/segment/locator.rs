//! Step location.
//!
//! One forward pass over the log. Each line is offered to the still-unfound
//! patterns in list order and claimed by the first one that matches, so two
//! ambiguous identifiers resolve by their position in the workflow, not by
//! which one appears first in the log.

use regex::{Regex, RegexBuilder};

use super::normalize::LogLines;
use crate::workflow::StepSpec;

/// Per-step working state for one segmentation call.
#[derive(Debug, Clone)]
pub struct Pattern<'a> {
    pub spec: &'a StepSpec,
    pub identifier: String,
    matcher: Option<Regex>,
    pub start_line: Option<usize>,
    pub end_line: Option<usize>,
}

impl<'a> Pattern<'a> {
    pub fn new(spec: &'a StepSpec, identifier: String) -> Self {
        let matcher = compile_matcher(&identifier);
        if matcher.is_none() {
            tracing::warn!(identifier = %identifier, "identifier could not be compiled; step will stay unresolved");
        }
        Self {
            spec,
            identifier,
            matcher,
            start_line: None,
            end_line: None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.start_line.is_some()
    }

    /// Whether the identifier occurs in `line` as a whole token.
    pub fn matches(&self, line: &str) -> bool {
        self.matcher
            .as_ref()
            .is_some_and(|re| find_bounded(re, &self.identifier, line))
    }
}

/// Case-insensitive matcher for the literal identifier.
fn compile_matcher(identifier: &str) -> Option<Regex> {
    RegexBuilder::new(&regex::escape(identifier))
        .case_insensitive(true)
        .build()
        .ok()
}

/// Characters that continue a token. `-` is included so `Run test` does not
/// match inside `Run test-unit`.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Find an occurrence whose neighbours do not extend the identifier's edge
/// tokens. A boundary is only required on a side where the identifier itself
/// ends in a word character.
fn find_bounded(re: &Regex, identifier: &str, line: &str) -> bool {
    let check_left = identifier.chars().next().is_some_and(is_word_char);
    let check_right = identifier.chars().next_back().is_some_and(is_word_char);

    let mut from = 0;
    while let Some(m) = re.find_at(line, from) {
        let left_ok = !check_left || !line[..m.start()].chars().next_back().is_some_and(is_word_char);
        let right_ok = !check_right || !line[m.end()..].chars().next().is_some_and(is_word_char);
        if left_ok && right_ok {
            return true;
        }
        // Retry from the next character to catch overlapping occurrences
        let step = line[m.start()..].chars().next().map_or(1, char::len_utf8);
        from = m.start() + step;
        if from > line.len() {
            break;
        }
    }
    false
}

/// Record the first matching line of every pattern, scanning from `start`.
///
/// A line is claimed by at most one pattern. Patterns without a match keep
/// `start_line == None`.
pub fn locate(lines: &LogLines, start: usize, patterns: &mut [Pattern<'_>]) {
    let mut remaining = patterns.iter().filter(|p| !p.is_found()).count();

    for (index, line) in lines.iter_from(start) {
        if remaining == 0 {
            break;
        }
        if let Some(pattern) = patterns
            .iter_mut()
            .find(|p| !p.is_found() && p.matches(line))
        {
            tracing::debug!(identifier = %pattern.identifier, line = index, "step located");
            pattern.start_line = Some(index);
            remaining -= 1;
        }
    }
}
