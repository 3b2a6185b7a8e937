//! Batch segmentation over the fixture logs

use std::fs;

use tempfile::TempDir;

use stepslice::batch::{discover_logs, load_manifest, JobStatus, SUMMARY_FILENAME};
use stepslice::files::artifacts::RECORDS_FILENAME;
use stepslice::{ArtifactWriter, BatchRunner, Segmenter, WorkflowCache};

use crate::helpers::{fixture_path, fixtures_dir};

fn runner(output: &std::path::Path) -> BatchRunner {
    BatchRunner::new(Segmenter::default(), ArtifactWriter::new(output), true)
}

#[test]
fn logs_dir_segments_every_job() {
    let output = TempDir::new().unwrap();
    let inputs = discover_logs(&fixtures_dir().join("logs"), &fixture_path("ci.yml")).unwrap();
    let mut cache = WorkflowCache::new();

    let report = runner(output.path()).run(&inputs, &mut cache);

    assert_eq!(report.segmented_count(), 2);
    assert_eq!(cache.len(), 1);
    assert!(output.path().join("build").join(RECORDS_FILENAME).exists());
    assert!(output.path().join("Deploy-site").join(RECORDS_FILENAME).exists());
}

#[test]
fn dependencies_are_reported_per_job() {
    let output = TempDir::new().unwrap();
    let inputs = discover_logs(&fixtures_dir().join("logs"), &fixture_path("ci.yml")).unwrap();

    let report = runner(output.path()).run(&inputs, &mut WorkflowCache::new());

    let deploy = report
        .jobs
        .iter()
        .find(|j| j.job_name == "Deploy site")
        .unwrap();
    match &deploy.status {
        JobStatus::Segmented {
            dependencies,
            resolved,
            ..
        } => {
            assert_eq!(dependencies, &["build".to_string()]);
            assert_eq!(*resolved, 1);
        }
        other => panic!("expected segmented job, got {:?}", other),
    }
}

#[test]
fn manifest_with_missing_log_skips_only_that_job() {
    let output = TempDir::new().unwrap();
    let inputs = load_manifest(&fixture_path("manifest.json")).unwrap();

    let report = runner(output.path()).run(&inputs, &mut WorkflowCache::new());

    assert_eq!(report.segmented_count(), 2);
    assert_eq!(report.skipped_count(), 1);
    assert!(matches!(report.jobs[2].status, JobStatus::Skipped { .. }));
}

#[test]
fn summary_is_written_as_json() {
    let output = TempDir::new().unwrap();
    let inputs = load_manifest(&fixture_path("manifest.json")).unwrap();
    let report = runner(output.path()).run(&inputs, &mut WorkflowCache::new());

    let path = report.write_summary(output.path()).unwrap();

    assert_eq!(path, output.path().join(SUMMARY_FILENAME));
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert!(summary["extracted_at"].is_string());
    assert_eq!(summary["jobs"][0]["status"], "segmented");
    assert_eq!(summary["jobs"][2]["status"], "skipped");
}
