//! In-process helpers for the black-box tests under `tests/`.
//!
//! `halite` has no separate compile step, so unlike a compiler test
//! harness these run the pipeline directly against a source string and
//! assert on the captured `print` output and diagnostics, instead of
//! spawning a built binary against a fixture file.

use halite::CheckFailure;

/// Runs `source` to completion and returns everything written through
/// `print`. Panics with the collected diagnostics if the program fails
/// to check or to run.
pub fn run_ok(source: &str) -> String {
    let mut out = Vec::new();
    match halite::run_source(source, &mut out) {
        Ok(_) => String::from_utf8(out).expect("program output is valid utf-8"),
        Err(failure) => panic!(
            "expected '{source}' to run successfully, got errors: {:#?}",
            failure.errors
        ),
    }
}

/// Runs `source` and asserts its `print` output matches `expected`
/// exactly.
pub fn assert_output(source: &str, expected: &str) {
    assert_eq!(run_ok(source), expected);
}

/// Runs `source` and returns the collected check failure, asserting that
/// checking (lexing/parsing/semantic analysis) actually failed.
pub fn expect_check_failure(source: &str) -> CheckFailure {
    let mut out = Vec::new();
    let failure = halite::run_source(source, &mut out).expect_err("expected source to fail to check");
    assert!(out.is_empty(), "checking should fail before anything runs");
    failure
}

/// Runs `source` and asserts that some diagnostic's rendered message
/// contains `fragment`.
pub fn expect_diagnostic_containing(source: &str, fragment: &str) {
    let mut out = Vec::new();
    let failure = match halite::run_source(source, &mut out) {
        Ok(_) => panic!("expected '{source}' to fail, but it ran successfully"),
        Err(failure) => failure,
    };
    assert!(
        failure.errors.iter().any(|e| e.to_string().contains(fragment)),
        "expected an error containing {fragment:?}, got {:#?}",
        failure.errors
    );
}

/// Runs `source`, which is expected to fail partway through execution
/// after producing some output, and returns that partial output.
pub fn expect_runtime_error_containing(source: &str, fragment: &str) -> String {
    let mut out = Vec::new();
    let failure = halite::run_source(source, &mut out).expect_err("expected a runtime failure");
    assert!(
        failure.errors.iter().any(|e| e.to_string().contains(fragment)),
        "expected a runtime error containing {fragment:?}, got {:#?}",
        failure.errors
    );
    String::from_utf8(out).expect("partial program output is valid utf-8")
}
