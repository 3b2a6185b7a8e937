//! Jobs subcommand handler

use std::path::Path;

use anyhow::{Context, Result};

use stepslice::segment::derive_identifier;
use stepslice::segment::record::display_name;
use stepslice::{Config, WorkflowDefinition};

/// List the jobs of a workflow with their steps' identifiers.
#[cfg(not(tarpaulin_include))]
pub fn handle(config: &Config, path: &Path) -> Result<()> {
    let workflow = WorkflowDefinition::load(path)
        .with_context(|| format!("Failed to load workflow {}", path.display()))?;
    print!("{}", format_jobs(config, &workflow));
    Ok(())
}

/// One block per job: key, display name, dependencies, then one line per
/// step with the identifier searched for in its log.
pub fn format_jobs(config: &Config, workflow: &WorkflowDefinition) -> String {
    if workflow.jobs.is_empty() {
        return "No jobs defined.\n".to_string();
    }

    let mut out = String::new();
    for job in &workflow.jobs {
        match &job.name {
            Some(name) => out.push_str(&format!("{} ({})\n", job.key, name)),
            None => out.push_str(&format!("{}\n", job.key)),
        }
        if !job.needs.is_empty() {
            out.push_str(&format!("  needs: {}\n", job.needs.join(", ")));
        }
        for (index, step) in job.steps.iter().enumerate() {
            out.push_str(&format!(
                "  {:>2}. {} -> {}\n",
                index + 1,
                display_name(step),
                derive_identifier(step, &config.segmentation)
            ));
        }
    }
    out
}
