//! Log-to-step segmentation.
//!
//! Splits one raw CI job log into contiguous slices, one per workflow step
//! plus an implicit setup slice. Runner logs carry no reliable step
//! delimiters, so boundaries are found lexically: each step gets an
//! identifier that mirrors the header the runner echoes when the step
//! starts, and the first line matching it opens the step's slice.
//!
//! # Pipeline
//!
//! 1. [`normalize`] strips escape sequences and provider markers
//! 2. [`setup`] cuts off the runner output before the job sentinel
//! 3. [`identifier`] derives a searchable identifier per step
//! 4. [`locator`] finds each identifier's first occurrence in one pass
//! 5. [`ranges`] closes each found step at the start of the next
//! 6. [`record`] assembles the output records
//!
//! Segmentation never fails. A missing sentinel, an empty step list or an
//! empty log all produce smaller outputs, and every step always yields a
//! record, resolved or marked unresolved.

pub mod config;
pub mod identifier;
pub mod locator;
pub mod normalize;
pub mod ranges;
pub mod record;
pub mod setup;

use serde::{Deserialize, Serialize};

pub use config::SegmentationConfig;
pub use identifier::derive_identifier;
pub use locator::Pattern;
pub use normalize::{LogLines, Normalizer};
pub use record::{render_workflow_code, StepRecord, StepType};
pub use setup::SetupSegment;

use crate::workflow::StepSpec;
use record::{NOT_FOUND_NOTE, NO_SENTINEL_NOTE};

/// Result of segmenting one job log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmentation {
    pub job_name: String,
    /// Number of normalized log lines
    pub total_lines: usize,
    /// Whether the setup sentinel was present
    pub sentinel_found: bool,
    /// Setup record first, then resolved steps in log order, then
    /// unresolved steps in workflow order
    pub records: Vec<StepRecord>,
}

impl Segmentation {
    pub fn setup(&self) -> Option<&StepRecord> {
        self.records.first().filter(|r| r.is_setup())
    }

    /// Step records, without the setup record.
    pub fn steps(&self) -> &[StepRecord] {
        match self.records.first() {
            Some(first) if first.is_setup() => &self.records[1..],
            _ => &self.records,
        }
    }

    pub fn resolved_count(&self) -> usize {
        self.steps().iter().filter(|r| r.is_resolved()).count()
    }

    pub fn unresolved_count(&self) -> usize {
        self.steps().iter().filter(|r| !r.is_resolved()).count()
    }
}

/// Segmentation engine.
///
/// Holds only configuration; every call works on its own state, so one
/// instance can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmentationConfig,
    normalizer: Normalizer,
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        let normalizer = Normalizer::new(config.strip_timestamps);
        Self { config, normalizer }
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Segment one raw job log against the job's declared steps.
    pub fn segment(&self, raw_log: &str, steps: &[StepSpec], job_name: &str) -> Segmentation {
        let lines = self.normalizer.normalize(raw_log);
        tracing::debug!(job = job_name, lines = lines.len(), steps = steps.len(), "segmenting log");

        let mut setup = setup::detect_setup(&lines, &self.config.sentinel_for(job_name));
        if steps.is_empty() {
            setup = setup.covering_whole_log(&lines);
        }
        if !setup.sentinel_found() {
            tracing::warn!(job = job_name, "setup sentinel not found; treating whole log as setup");
        }

        let mut patterns: Vec<Pattern<'_>> = steps
            .iter()
            .map(|spec| Pattern::new(spec, derive_identifier(spec, &self.config)))
            .collect();

        if let Some(start) = setup.search_from {
            locator::locate(&lines, start, &mut patterns);
            ranges::assign_ranges(&mut patterns, lines.len());
        }

        let unresolved_note = if setup.sentinel_found() {
            NOT_FOUND_NOTE
        } else {
            NO_SENTINEL_NOTE
        };

        let mut records = Vec::with_capacity(patterns.len() + 1);
        records.push(StepRecord::setup(&setup));
        records.extend(
            ranges::found_in_log_order(&patterns)
                .into_iter()
                .map(|index| StepRecord::resolved(&patterns[index], &lines)),
        );
        for pattern in patterns.iter().filter(|p| !p.is_found()) {
            tracing::debug!(job = job_name, identifier = %pattern.identifier, "step not found in log");
            records.push(StepRecord::unresolved(pattern, unresolved_note));
        }

        Segmentation {
            job_name: job_name.to_string(),
            total_lines: lines.len(),
            sentinel_found: setup.sentinel_found(),
            records,
        }
    }
}
