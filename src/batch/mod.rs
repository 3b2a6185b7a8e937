//! Batch segmentation across many job logs.
//!
//! Workflow definitions are loaded once per pass into a [`WorkflowCache`],
//! then jobs are segmented in parallel. A job that cannot be read or whose
//! workflow fails to load is skipped and reported; it never stops the pass.

mod cache;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use cache::WorkflowCache;

use crate::files::filename::{job_name_from_log_file, match_job_log};
use crate::files::artifacts::unique_job_dirs;
use crate::files::{read_log, ArtifactWriter};
use crate::segment::{Segmentation, Segmenter};
use crate::workflow::WorkflowDefinition;

/// Name of the batch summary written to the output root.
pub const SUMMARY_FILENAME: &str = "summary.json";

/// Extension of provider job log files.
const LOG_EXTENSION: &str = "txt";

/// One job to segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInput {
    pub log_path: PathBuf,
    pub workflow_path: PathBuf,
    pub job_name: String,
}

impl JobInput {
    /// Input whose job name is taken from the log file name.
    pub fn from_log_file(log_path: impl Into<PathBuf>, workflow_path: impl Into<PathBuf>) -> Self {
        let log_path = log_path.into();
        let file_name = log_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            job_name: job_name_from_log_file(&file_name),
            log_path,
            workflow_path: workflow_path.into(),
        }
    }
}

/// Collect every `*.txt` log in `dir`, all bound to one workflow.
pub fn discover_logs(dir: &Path, workflow_path: &Path) -> Result<Vec<JobInput>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read log directory {}", dir.display()))?;

    let mut logs: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == LOG_EXTENSION) {
            logs.push(path);
        }
    }
    logs.sort();

    Ok(logs
        .into_iter()
        .map(|log| JobInput::from_log_file(log, workflow_path))
        .collect())
}

#[derive(Debug, Deserialize)]
struct Manifest {
    jobs: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    log: PathBuf,
    workflow: PathBuf,
    #[serde(default)]
    job: Option<String>,
}

/// Load job inputs from a JSON manifest.
///
/// ```json
/// { "jobs": [ { "log": "logs/1_build.txt", "workflow": "ci.yml", "job": "build" } ] }
/// ```
///
/// Relative paths are resolved against the manifest's directory; a missing
/// `job` is derived from the log file name.
pub fn load_manifest(path: &Path) -> Result<Vec<JobInput>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    let manifest: Manifest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));

    Ok(manifest
        .jobs
        .into_iter()
        .map(|entry| {
            let log_path = base.join(&entry.log);
            let workflow_path = base.join(&entry.workflow);
            match entry.job {
                Some(job_name) => JobInput {
                    log_path,
                    workflow_path,
                    job_name,
                },
                None => JobInput::from_log_file(log_path, workflow_path),
            }
        })
        .collect())
}

/// What happened to one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Segmented {
        total_lines: usize,
        resolved: usize,
        unresolved: usize,
        sentinel_found: bool,
        dependencies: Vec<String>,
        records_path: PathBuf,
    },
    Skipped {
        reason: String,
    },
}

/// Outcome of one job in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub job_name: String,
    pub log_path: PathBuf,
    #[serde(flatten)]
    pub status: JobStatus,
}

impl JobOutcome {
    fn skipped(input: &JobInput, reason: impl Into<String>) -> Self {
        Self {
            job_name: input.job_name.clone(),
            log_path: input.log_path.clone(),
            status: JobStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn is_segmented(&self) -> bool {
        matches!(self.status, JobStatus::Segmented { .. })
    }
}

/// Result of a batch pass.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// RFC 3339 time the pass finished
    pub extracted_at: String,
    pub jobs: Vec<JobOutcome>,
}

impl BatchReport {
    pub fn segmented_count(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_segmented()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.jobs.len() - self.segmented_count()
    }

    /// Write `summary.json` into `dir`.
    pub fn write_summary(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(SUMMARY_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// Segments many jobs and persists their artifacts.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    segmenter: Segmenter,
    writer: ArtifactWriter,
    lossy_utf8: bool,
}

impl BatchRunner {
    pub fn new(segmenter: Segmenter, writer: ArtifactWriter, lossy_utf8: bool) -> Self {
        Self {
            segmenter,
            writer,
            lossy_utf8,
        }
    }

    /// Segment every input. Order of outcomes follows `inputs`.
    pub fn run(&self, inputs: &[JobInput], cache: &mut WorkflowCache) -> BatchReport {
        let workflows = preload_workflows(inputs, cache);
        let dir_names = unique_job_dirs(inputs.iter().map(|i| i.job_name.as_str()));

        let jobs: Vec<JobOutcome> = inputs
            .par_iter()
            .zip(&dir_names)
            .map(|(input, dir_name)| match workflows.get(&input.workflow_path) {
                Some(Ok(workflow)) => self.process(input, dir_name, workflow),
                Some(Err(reason)) => JobOutcome::skipped(input, reason.clone()),
                None => JobOutcome::skipped(input, "workflow not loaded"),
            })
            .collect();

        let report = BatchReport {
            extracted_at: chrono::Local::now().to_rfc3339(),
            jobs,
        };
        tracing::info!(
            segmented = report.segmented_count(),
            skipped = report.skipped_count(),
            "batch finished"
        );
        report
    }

    fn process(&self, input: &JobInput, dir_name: &str, workflow: &WorkflowDefinition) -> JobOutcome {
        let raw = match read_log(&input.log_path, self.lossy_utf8) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(job = %input.job_name, error = %e, "skipping job");
                return JobOutcome::skipped(input, e.to_string());
            }
        };

        let segmentation = segment_job(&self.segmenter, workflow, &raw, &input.job_name);

        let written = match self.writer.write_in(&segmentation, dir_name) {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(job = %input.job_name, error = %e, "failed to write artifacts");
                return JobOutcome::skipped(input, e.to_string());
            }
        };

        tracing::info!(
            job = %input.job_name,
            resolved = segmentation.resolved_count(),
            unresolved = segmentation.unresolved_count(),
            "job segmented"
        );

        JobOutcome {
            job_name: input.job_name.clone(),
            log_path: input.log_path.clone(),
            status: JobStatus::Segmented {
                total_lines: segmentation.total_lines,
                resolved: segmentation.resolved_count(),
                unresolved: segmentation.unresolved_count(),
                sentinel_found: segmentation.sentinel_found,
                dependencies: workflow
                    .dependencies_for_job(&resolve_job_name(workflow, &input.job_name))
                    .to_vec(),
                records_path: written.records_path,
            },
        }
    }
}

/// Map a job name recovered from a log file onto a workflow job.
///
/// Names the workflow already resolves are kept. Otherwise job keys and
/// display names are compared after normalization, so `Build (linux)`
/// finds `build_linux`. Unmatched names are returned unchanged.
pub fn resolve_job_name(workflow: &WorkflowDefinition, name: &str) -> String {
    if workflow.find_job(name).is_some() {
        return name.to_string();
    }
    let candidates = workflow
        .jobs
        .iter()
        .flat_map(|job| std::iter::once(job.key.as_str()).chain(job.name.as_deref()));
    match match_job_log(name, candidates) {
        Some(matched) => {
            tracing::debug!(from = name, to = matched, "job name resolved");
            matched.to_string()
        }
        None => name.to_string(),
    }
}

/// Segment a log for `job_name`.
///
/// Steps come from the workflow job `job_name` resolves to, while the setup
/// sentinel is always built from `job_name` itself: that is the name the
/// runner printed, which may differ from the workflow key it matched.
pub fn segment_job(
    segmenter: &Segmenter,
    workflow: &WorkflowDefinition,
    raw_log: &str,
    job_name: &str,
) -> Segmentation {
    let resolved = resolve_job_name(workflow, job_name);
    segmenter.segment(raw_log, workflow.steps_for_job(&resolved), job_name)
}

type LoadedWorkflows = HashMap<PathBuf, Result<Arc<WorkflowDefinition>, String>>;

/// Load every distinct workflow up front so the parallel phase only reads.
fn preload_workflows(inputs: &[JobInput], cache: &mut WorkflowCache) -> LoadedWorkflows {
    let mut loaded = LoadedWorkflows::new();
    for input in inputs {
        if loaded.contains_key(&input.workflow_path) {
            continue;
        }
        let result = cache.get_or_load(&input.workflow_path).map_err(|e| {
            tracing::warn!(path = %input.workflow_path.display(), error = %e, "workflow unavailable");
            e.to_string()
        });
        loaded.insert(input.workflow_path.clone(), result);
    }
    loaded
}
