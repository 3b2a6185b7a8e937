//! Segment subcommand handler

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};

use stepslice::batch::segment_job;
use stepslice::files::filename::job_name_from_log_file;
use stepslice::files::read_log;
use stepslice::{ArtifactWriter, Config, Segmentation, Segmenter, WorkflowDefinition};

/// Arguments of `stepslice segment`.
pub struct SegmentArgs {
    pub log: PathBuf,
    pub workflow: PathBuf,
    pub job: Option<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

/// Segment one log and print the result.
#[cfg(not(tarpaulin_include))]
pub fn handle(config: &Config, args: SegmentArgs) -> Result<()> {
    let workflow = WorkflowDefinition::load(&args.workflow)
        .with_context(|| format!("Failed to load workflow {}", args.workflow.display()))?;

    let job_name = match args.job {
        Some(job) => job,
        None => {
            let file_name = args
                .log
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .context("Log path has no file name; pass --job")?;
            job_name_from_log_file(&file_name)
        }
    };

    let raw = read_log(&args.log, config.input.lossy_utf8)?;
    let segmenter = Segmenter::new(config.segmentation.clone());
    let segmentation = segment_job(&segmenter, &workflow, &raw, &job_name);

    if let Some(output) = args.output {
        let written = ArtifactWriter::new(output)
            .pretty(config.output.pretty_json)
            .inline_logs(config.output.inline_logs)
            .write(&segmentation)?;
        eprintln!("Artifacts written to {}", written.directory.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&segmentation)?);
    } else {
        print!("{}", format_summary(&segmentation));
    }
    Ok(())
}

/// Human-readable table of a segmentation.
pub fn format_summary(segmentation: &Segmentation) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Job: {} ({} lines)",
        segmentation.job_name, segmentation.total_lines
    );
    if !segmentation.sentinel_found {
        let _ = writeln!(out, "Setup sentinel not found; steps were not searched");
    }

    for record in &segmentation.records {
        if record.is_resolved() {
            let _ = writeln!(
                out,
                "  {:>6} - {:<6} {}",
                record.start_line, record.end_line, record.name
            );
        } else {
            let note = record.resolution_note.as_deref().unwrap_or("unresolved");
            let _ = writeln!(out, "  {:>6} - {:<6} {} ({})", "?", "?", record.name, note);
        }
    }

    let _ = writeln!(
        out,
        "{} step(s): {} resolved, {} unresolved",
        segmentation.steps().len(),
        segmentation.resolved_count(),
        segmentation.unresolved_count()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepslice::StepSpec;

    #[test]
    fn summary_lists_every_record() {
        let steps = [
            StepSpec::run("echo hi").with_name("Greet"),
            StepSpec::run("deploy.sh").with_name("Deploy"),
        ];
        let segmentation = Segmenter::default().segment(
            "Complete job name: build\nRun echo hi\nhello\n",
            &steps,
            "build",
        );

        insta::assert_snapshot!(format_summary(&segmentation), @r"
        Job: build (3 lines)
               0 - 0      Set up job
               1 - 2      Greet
               ? - ?      Deploy (Step not found in log)
        2 step(s): 1 resolved, 1 unresolved
        ");
    }
}
