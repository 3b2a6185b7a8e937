//! End-to-end segmentation of a recorded job log

use stepslice::segment::record::{NOT_FOUND_NOTE, NO_SENTINEL_NOTE};
use stepslice::segment::{SegmentationConfig, StepType};
use stepslice::{Segmenter, StepSpec, WorkflowDefinition};

use crate::helpers::{fixture_path, load_fixture};

fn segment_build_log() -> stepslice::Segmentation {
    let workflow = WorkflowDefinition::load(fixture_path("ci.yml")).unwrap();
    let raw = load_fixture("logs/1_build.txt");
    Segmenter::default().segment(&raw, workflow.steps_for_job("build"), "build")
}

// ============================================================================
// Recorded Log Tests
// ============================================================================

#[test]
fn build_log_yields_one_record_per_step_plus_setup() {
    let segmentation = segment_build_log();

    assert_eq!(segmentation.total_lines, 21);
    assert!(segmentation.sentinel_found);
    assert_eq!(segmentation.records.len(), 5);
    assert_eq!(segmentation.records[0].step_type, StepType::Setup);
}

#[test]
fn build_log_ranges_are_contiguous() {
    let segmentation = segment_build_log();

    let ranges: Vec<(&str, i64, i64)> = segmentation
        .records
        .iter()
        .map(|r| (r.name.as_str(), r.start_line, r.end_line))
        .collect();

    assert_eq!(
        ranges,
        [
            ("Set up job", 0, 3),
            ("Run actions/checkout@v4", 4, 8),
            ("Install toolchain", 9, 13),
            ("Test", 14, 20),
            ("Upload coverage", -1, -1),
        ]
    );
}

#[test]
fn build_log_content_is_normalized() {
    let segmentation = segment_build_log();
    let test_step = &segmentation.records[3];

    assert!(test_step.log_content.starts_with("Run cargo test --all\ncargo test --all\n"));
    assert!(test_step.log_content.contains("test result: ok. 12 passed"));
    assert!(!test_step.log_content.contains('\x1b'));
    assert!(!test_step.log_content.contains("##["));
    assert_eq!(test_step.env.get("RUST_BACKTRACE").map(String::as_str), Some("1"));
}

#[test]
fn missing_step_keeps_its_workflow_code() {
    let segmentation = segment_build_log();
    let upload = &segmentation.records[4];

    assert!(!upload.is_resolved());
    assert_eq!(upload.resolution_note.as_deref(), Some(NOT_FOUND_NOTE));
    assert_eq!(upload.workflow_code, "Uses: codecov/codecov-action@v4\nName: Upload coverage");
    assert!(upload.log_content.is_empty());
}

#[test]
fn records_serialize_with_type_field() {
    let segmentation = segment_build_log();
    let json = serde_json::to_value(&segmentation.records[1]).unwrap();

    assert_eq!(json["type"], "action");
    assert_eq!(json["matched_identifier"], "Run actions/checkout@v4");
}

#[test]
fn segmentation_is_deterministic() {
    assert_eq!(segment_build_log(), segment_build_log());
}

// ============================================================================
// Sentinel Tests
// ============================================================================

#[test]
fn log_for_another_job_is_all_setup() {
    let workflow = WorkflowDefinition::load(fixture_path("ci.yml")).unwrap();
    let raw = load_fixture("logs/1_build.txt");

    let segmentation =
        Segmenter::default().segment(&raw, workflow.steps_for_job("Deploy site"), "Deploy site");

    assert!(!segmentation.sentinel_found);
    assert_eq!(segmentation.records[0].end_line, 20);
    assert_eq!(segmentation.records[1].resolution_note.as_deref(), Some(NO_SENTINEL_NOTE));
}

#[test]
fn custom_sentinel_prefix_is_honored() {
    let config = SegmentationConfig {
        sentinel_prefix: "Starting job ".to_string(),
        ..SegmentationConfig::default()
    };
    let steps = [StepSpec::run("make")];

    let segmentation =
        Segmenter::new(config).segment("boot\nStarting job build\nRun make\nok\n", &steps, "build");

    assert_eq!(segmentation.records[0].end_line, 1);
    assert_eq!(segmentation.records[1].start_line, 2);
}
