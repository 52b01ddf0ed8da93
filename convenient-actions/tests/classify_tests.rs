//! Failure classification contract
//!
//! Downstream reporting branches on the variant `classify` produces, so the
//! precedence order is tested shape by shape.

use convenient_actions::{
    ActionExecutionError, ActionFailure, ActionRef, BuildFailedError, FailureRecord, FatalError,
    Fault, Location, MissingInputFileError, RuntimeFault, TaskTermination, TestExecError,
    classify,
};
use convenient_target::Label;
use std::collections::BTreeSet;
use std::error::Error as _;
use std::fmt;
use std::path::PathBuf;

fn label(s: &str) -> Label {
    s.parse().unwrap()
}

/// An error type the pipeline never produces.
#[derive(Debug)]
struct SocketClosed;

impl fmt::Display for SocketClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("worker socket closed")
    }
}

impl std::error::Error for SocketClosed {}

/// A foreign error whose source is a test failure.
#[derive(Debug, thiserror::Error)]
#[error("remote runner failed")]
struct RemoteRunnerError(#[source] TestExecError);

fn compile_action() -> ActionRef {
    ActionRef {
        mnemonic: "CppCompile".to_string(),
        owner: Some(label("//foo:lib")),
        primary_output: PathBuf::from("bin/foo/_objs/lib/lib.o"),
    }
}

/// One termination of every shape, paired with the expected record kind.
fn every_shape() -> Vec<(TaskTermination, &'static str)> {
    vec![
        (
            TaskTermination::new("w", TestExecError::new("test timed out")),
            "test-execution-failure",
        ),
        (
            TaskTermination::new(
                "w",
                ActionExecutionError::new("test action failed")
                    .caused_by(TestExecError::new("test crashed")),
            ),
            "test-execution-failure",
        ),
        (
            TaskTermination::new("w", ActionExecutionError::new("compile failed")),
            "build-failure",
        ),
        (
            TaskTermination::new("w", MissingInputFileError::new("missing input file")),
            "build-failure",
        ),
        (
            TaskTermination::new("w", RuntimeFault::new("illegal state")),
            "runtime-fault",
        ),
        (
            TaskTermination::new("w", FatalError::new("out of memory")),
            "fatal-error",
        ),
        (
            TaskTermination::new("w", ActionFailure::unexpected(SocketClosed)),
            "unexpected-cause",
        ),
    ]
}

#[test]
fn test_catastrophe_without_location_uses_wrapper_message() {
    let termination = TaskTermination::new(
        "Executing genrule //foo:gen failed: disk quota exceeded",
        ActionExecutionError::new("disk quota exceeded").catastrophic(),
    );

    let FailureRecord::BuildFailure(failure) = classify(termination) else {
        panic!("expected a build failure");
    };
    assert!(failure.catastrophic);
    assert_eq!(
        failure.message,
        "Executing genrule //foo:gen failed: disk quota exceeded"
    );
}

#[test]
fn test_nested_test_failure_wins_over_action_failure() {
    let termination = TaskTermination::new(
        "Executing TestRunner //foo:foo_test failed",
        ActionExecutionError::new("test action failed")
            .with_location(Location::at("foo/BUILD", 10, 1))
            .catastrophic()
            .with_action(compile_action())
            .caused_by(TestExecError::new("//foo:foo_test failed to execute")),
    );

    match classify(termination) {
        FailureRecord::TestExecutionFailure(test_failure) => {
            assert_eq!(test_failure.message, "//foo:foo_test failed to execute");
        }
        other => panic!("expected a test execution failure, got {}", other.kind()),
    }
}

#[test]
fn test_test_failure_under_unexpected_cause() {
    let termination = TaskTermination::new(
        "w",
        ActionFailure::unexpected(RemoteRunnerError(TestExecError::new("shard 3 crashed"))),
    );

    let record = classify(termination);
    assert_eq!(record.kind(), "test-execution-failure");
    assert!(!record.is_catastrophe());
    let FailureRecord::TestExecutionFailure(test_failure) = record else {
        panic!("expected a test execution failure");
    };
    assert_eq!(test_failure.message, "shard 3 crashed");

    let nested = TaskTermination::new(
        "w",
        ActionExecutionError::new("test action failed").caused_by(ActionFailure::unexpected(
            RemoteRunnerError(TestExecError::new("timeout")),
        )),
    );
    assert_eq!(classify(nested).kind(), "test-execution-failure");
}

#[test]
fn test_action_failure_carries_diagnostics() {
    let termination = TaskTermination::new(
        "wrapper message",
        ActionExecutionError::new("C++ compilation of rule '//foo:lib' failed")
            .with_location(Location::at("foo/BUILD", 5, 1))
            .with_action(compile_action())
            .with_root_causes([label("//foo:lib"), label("//base:strings")])
            .already_shown(),
    );

    let record = classify(termination);
    assert!(!record.is_catastrophe());
    assert!(record.error_already_shown());

    let FailureRecord::BuildFailure(failure) = record else {
        panic!("expected a build failure");
    };
    assert_eq!(
        failure,
        BuildFailedError {
            message: "foo/BUILD:5:1 C++ compilation of rule '//foo:lib' failed".to_string(),
            catastrophic: false,
            action: Some(compile_action()),
            root_causes: BTreeSet::from([label("//base:strings"), label("//foo:lib")]),
            error_already_shown: true,
        }
    );
}

#[test]
fn test_non_test_inner_cause_does_not_change_classification() {
    let termination = TaskTermination::new(
        "w",
        ActionExecutionError::new("linking failed").caused_by(RuntimeFault::new("npe")),
    );
    assert!(matches!(classify(termination), FailureRecord::BuildFailure(_)));
}

#[test]
fn test_missing_input_has_no_details() {
    let record = classify(TaskTermination::new(
        "w",
        MissingInputFileError::new("//foo:a.h: missing input file"),
    ));
    assert!(!record.is_catastrophe());
    assert!(!record.error_already_shown());

    let FailureRecord::BuildFailure(failure) = record else {
        panic!("expected a build failure");
    };
    assert_eq!(failure.message, "//foo:a.h: missing input file");
    assert!(failure.action.is_none());
    assert!(failure.root_causes.is_empty());
}

#[test]
fn test_runtime_and_fatal_pass_through_unchanged() {
    let FailureRecord::Fault(Fault::Runtime(fault)) =
        classify(TaskTermination::new("w", RuntimeFault::new("illegal state")))
    else {
        panic!("expected a runtime fault");
    };
    assert_eq!(fault, RuntimeFault::new("illegal state"));

    let FailureRecord::Fault(Fault::Fatal(fatal)) =
        classify(TaskTermination::new("w", FatalError::new("out of memory")))
    else {
        panic!("expected a fatal error");
    };
    assert_eq!(fatal, FatalError::new("out of memory"));
}

#[test]
fn test_unexpected_cause_keeps_original() {
    let record = classify(TaskTermination::new("w", ActionFailure::unexpected(SocketClosed)));
    assert!(record.is_catastrophe());
    assert_eq!(
        record.to_string(),
        "action terminated with unexpected exception: worker socket closed"
    );

    let FailureRecord::Fault(Fault::Unexpected(unexpected)) = record else {
        panic!("expected an unexpected-cause fault");
    };
    let source = unexpected.source().unwrap();
    assert!(source.downcast_ref::<SocketClosed>().is_some());
}

#[test]
fn test_classification_is_total_and_deterministic() {
    let first: Vec<&str> = every_shape()
        .into_iter()
        .map(|(termination, expected)| {
            let kind = classify(termination).kind();
            assert_eq!(kind, expected);
            kind
        })
        .collect();
    let second: Vec<&str> = every_shape()
        .into_iter()
        .map(|(termination, _)| classify(termination).kind())
        .collect();
    assert_eq!(first, second);
}
