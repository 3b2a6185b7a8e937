//! stepslice - split CI job logs into per-step slices

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};

mod commands;

use stepslice::Config;

/// Split raw CI job logs into per-step slices aligned with the workflow definition
#[derive(Parser)]
#[command(name = "stepslice")]
#[command(version)]
#[command(about = "Split raw CI job logs into per-step slices", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Use this config file instead of the user config
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment one job log into steps
    #[command(long_about = "Segment one job log into steps.

Prints a summary of where each workflow step starts and ends in the log.
With --json the full records are printed instead. With --output the step
logs and records are also written to disk.

Example:
  stepslice segment logs/1_build.txt --workflow ci.yml --job build")]
    Segment {
        /// Raw job log
        log: PathBuf,
        /// Workflow YAML the job belongs to
        #[arg(short, long, value_name = "YAML")]
        workflow: PathBuf,
        /// Job key or display name; defaults to the one in the log file name
        #[arg(short, long)]
        job: Option<String>,
        /// Write artifacts under this directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Segment many job logs
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .args(["logs_dir", "manifest"])
    ))]
    Batch {
        /// Directory of `*.txt` job logs sharing one workflow
        #[arg(long, value_name = "DIR", requires = "workflow")]
        logs_dir: Option<PathBuf>,
        /// Workflow YAML for --logs-dir
        #[arg(short, long, value_name = "YAML")]
        workflow: Option<PathBuf>,
        /// JSON manifest listing logs, workflows and jobs
        #[arg(long, value_name = "JSON", conflicts_with = "workflow")]
        manifest: Option<PathBuf>,
        /// Output directory [default: from config]
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// List the jobs of a workflow
    Jobs {
        /// Workflow YAML
        workflow: PathBuf,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
    /// Write a default config file if none exists
    Init,
}

#[cfg(not(tarpaulin_include))]
fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

#[cfg(not(tarpaulin_include))]
fn main() {
    let cli = Cli::parse();

    if let Err(e) = stepslice::logging::init(cli.verbose) {
        eprintln!("Warning: {:#}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(not(tarpaulin_include))]
fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_ref();

    match cli.command {
        Commands::Segment {
            log,
            workflow,
            job,
            output,
            json,
        } => {
            let config = load_config(config_path)?;
            commands::segment::handle(
                &config,
                commands::segment::SegmentArgs {
                    log,
                    workflow,
                    job,
                    output,
                    json,
                },
            )
        }
        Commands::Batch {
            logs_dir,
            workflow,
            manifest,
            output,
        } => {
            let config = load_config(config_path)?;
            let source = match (logs_dir, workflow, manifest) {
                (_, _, Some(manifest)) => commands::batch::Source::Manifest(manifest),
                (Some(dir), Some(workflow), None) => commands::batch::Source::LogsDir { dir, workflow },
                _ => anyhow::bail!("--logs-dir requires --workflow"),
            };
            commands::batch::handle(&config, source, output)
        }
        Commands::Jobs { workflow } => {
            let config = load_config(config_path)?;
            commands::jobs::handle(&config, &workflow)
        }
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::handle_show(config_path),
            ConfigCommands::Path => commands::config::handle_path(config_path),
            ConfigCommands::Init => commands::config::handle_init(config_path),
        },
    }
}
