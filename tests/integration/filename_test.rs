//! Tests for artifact naming and log file name handling.

use rstest::rstest;

use stepslice::files::filename::{
    self, job_name_from_log_file, match_job_log, step_log_filename, FilenameError,
};

// ============================================================================
// Sanitization Tests
// ============================================================================

#[rstest]
#[case("my project", "my-project")]
#[case("my \t\n project", "my-project")]
#[case("path/to/file", "pathtofile")]
#[case("file:name*?", "filename")]
#[case("Build (linux, stable)", "Build-linux-stable")]
#[case("--leading and trailing--", "leading-and-trailing")]
#[case("Café déploiement", "Cafe-deploiement")]
#[case("CON", "_CON")]
#[case("con.log", "_con.log")]
#[case("", "step")]
#[case("///", "step")]
fn sanitize_cases(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(filename::sanitize(input), expected);
}

#[test]
fn sanitize_component_truncates_without_trailing_hyphen() {
    assert_eq!(filename::sanitize_component("abcd efgh", 5), "abcd");
}

// ============================================================================
// Step Log Name Tests
// ============================================================================

#[test]
fn step_logs_are_numbered_two_digits() {
    assert_eq!(step_log_filename(1, "Install toolchain").unwrap(), "01_Install-toolchain.log");
    assert_eq!(step_log_filename(12, "Deploy").unwrap(), "12_Deploy.log");
}

#[test]
fn step_log_names_stay_within_limits() {
    let name = step_log_filename(4, &"long step ".repeat(50)).unwrap();
    assert!(name.len() <= 255);
    assert!(name.starts_with("04_long-step"));
    assert!(name.ends_with(".log"));
}

#[test]
fn validate_length_reports_limit() {
    let err = filename::validate_length(&"a".repeat(256)).unwrap_err();
    assert_eq!(err, FilenameError::TooLong { length: 256, max: 255 });
    assert_eq!(err.to_string(), "Filename too long: 256 characters (max 255)");
}

// ============================================================================
// Log File Name Tests
// ============================================================================

#[rstest]
#[case("1_build.txt", "build")]
#[case("12_Deploy site.txt", "Deploy site")]
#[case("build.txt", "build")]
#[case("v1_build.txt", "v1_build")]
#[case("3_.txt", "3_")]
fn job_names_from_log_files(#[case] file: &str, #[case] expected: &str) {
    assert_eq!(job_name_from_log_file(file), expected);
}

#[test]
fn job_logs_match_fuzzily() {
    let logs = ["1_lint.txt", "2_Build (linux).txt", "3_test.txt"];
    let stems: Vec<String> = logs.iter().map(|l| job_name_from_log_file(l)).collect();

    assert_eq!(match_job_log("build_linux", stems.iter().map(String::as_str)), Some("Build (linux)"));
    assert_eq!(match_job_log("Test", stems.iter().map(String::as_str)), Some("test"));
    assert_eq!(match_job_log("deploy", stems.iter().map(String::as_str)), None);
}
