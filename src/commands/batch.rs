//! Batch subcommand handler

use std::path::PathBuf;

use anyhow::Result;

use stepslice::batch::{discover_logs, load_manifest, JobStatus};
use stepslice::{ArtifactWriter, BatchRunner, Config, Segmenter, WorkflowCache};

/// Where the batch inputs come from.
pub enum Source {
    LogsDir { dir: PathBuf, workflow: PathBuf },
    Manifest(PathBuf),
}

/// Segment every job in `source` and write a summary.
#[cfg(not(tarpaulin_include))]
pub fn handle(config: &Config, source: Source, output: Option<PathBuf>) -> Result<()> {
    let inputs = match source {
        Source::LogsDir { dir, workflow } => discover_logs(&dir, &workflow)?,
        Source::Manifest(path) => load_manifest(&path)?,
    };

    if inputs.is_empty() {
        println!("No job logs found.");
        return Ok(());
    }

    let output = output.unwrap_or_else(|| config.output.directory.clone());
    let writer = ArtifactWriter::new(&output)
        .pretty(config.output.pretty_json)
        .inline_logs(config.output.inline_logs);
    let runner = BatchRunner::new(
        Segmenter::new(config.segmentation.clone()),
        writer,
        config.input.lossy_utf8,
    );

    let report = runner.run(&inputs, &mut WorkflowCache::new());
    let summary_path = report.write_summary(&output)?;

    for job in &report.jobs {
        match &job.status {
            JobStatus::Segmented {
                resolved,
                unresolved,
                ..
            } => println!(
                "  {}: {} resolved, {} unresolved",
                job.job_name, resolved, unresolved
            ),
            JobStatus::Skipped { reason } => println!("  {}: skipped ({})", job.job_name, reason),
        }
    }
    println!(
        "{} job(s) segmented, {} skipped. Summary: {}",
        report.segmented_count(),
        report.skipped_count(),
        summary_path.display()
    );
    Ok(())
}
