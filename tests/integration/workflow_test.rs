//! Workflow definition loading and job lookup

use stepslice::workflow::WorkflowError;
use stepslice::WorkflowDefinition;

use crate::helpers::fixture_path;

#[test]
fn fixture_workflow_lists_jobs_in_order() {
    let workflow = WorkflowDefinition::load(fixture_path("ci.yml")).unwrap();

    assert_eq!(workflow.name.as_deref(), Some("CI"));
    assert_eq!(workflow.job_keys(), ["build", "deploy"]);
    assert_eq!(workflow.steps_for_job("build").len(), 4);
}

#[test]
fn jobs_are_found_by_key_name_or_partial_name() {
    let workflow = WorkflowDefinition::load(fixture_path("ci.yml")).unwrap();

    assert_eq!(workflow.find_job("deploy").map(|j| j.key.as_str()), Some("deploy"));
    assert_eq!(workflow.find_job("Deploy site").map(|j| j.key.as_str()), Some("deploy"));
    assert_eq!(workflow.find_job("deploy SITE").map(|j| j.key.as_str()), Some("deploy"));
    assert!(workflow.find_job("release").is_none());
}

#[test]
fn unknown_job_has_no_steps() {
    let workflow = WorkflowDefinition::load(fixture_path("ci.yml")).unwrap();
    assert!(workflow.steps_for_job("release").is_empty());
}

#[test]
fn needs_list_is_exposed_as_dependencies() {
    let workflow = WorkflowDefinition::load(fixture_path("ci.yml")).unwrap();

    assert_eq!(workflow.dependencies_for_job("Deploy site"), ["build"]);
    assert!(workflow.dependencies_for_job("build").is_empty());
}

#[test]
fn step_parameters_are_stringified() {
    let workflow = WorkflowDefinition::load(fixture_path("ci.yml")).unwrap();
    let toolchain = &workflow.steps_for_job("build")[1];

    let with = toolchain.with.as_ref().unwrap();
    assert_eq!(with.get("components").map(String::as_str), Some("clippy"));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = WorkflowDefinition::load(fixture_path("does-not-exist.yml")).unwrap_err();
    assert!(matches!(err, WorkflowError::Read { .. }));
}

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = WorkflowDefinition::parse("jobs: [unclosed").unwrap_err();
    assert!(matches!(err, WorkflowError::Parse(_)));
}
