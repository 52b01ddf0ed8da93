//! Classified failures handed to the build orchestrator

use crate::outcome::{ActionRef, FatalError, RuntimeFault, TestExecError};
use convenient_target::Label;
use std::collections::BTreeSet;
use std::error::Error as StdError;

/// The build failed because of an action or a missing input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BuildFailedError {
    /// Message shown to the user
    pub message: String,
    /// Whether the orchestrator should stop scheduling further work
    pub catastrophic: bool,
    /// The failed action, when known
    pub action: Option<ActionRef>,
    /// Targets the failure is attributed to
    pub root_causes: BTreeSet<Label>,
    /// Whether the diagnostic was already displayed by the executor
    pub error_already_shown: bool,
}

impl BuildFailedError {
    /// A plain failure with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            catastrophic: false,
            action: None,
            root_causes: BTreeSet::new(),
            error_already_shown: false,
        }
    }
}

/// The cause did not match any shape the pipeline is specified to produce.
#[derive(Debug, thiserror::Error)]
#[error("action terminated with unexpected exception: {message}")]
pub struct UnexpectedCause {
    /// Message of the original cause
    pub message: String,
    /// The original cause
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

/// A failure of the engine rather than of the build.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// Bug surfaced while running an action
    #[error(transparent)]
    Runtime(#[from] RuntimeFault),

    /// Unrecoverable system condition
    #[error(transparent)]
    Fatal(#[from] FatalError),

    /// Cause outside the pipeline's contract
    #[error(transparent)]
    Unexpected(#[from] UnexpectedCause),
}

/// Outcome of classifying a terminated action task.
#[derive(Debug, thiserror::Error)]
pub enum FailureRecord {
    /// Ordinary build failure
    #[error(transparent)]
    BuildFailure(#[from] BuildFailedError),

    /// A test failed to execute
    #[error(transparent)]
    TestExecutionFailure(#[from] TestExecError),

    /// Engine failure; always surfaced to the operator
    #[error(transparent)]
    Fault(#[from] Fault),
}

impl FailureRecord {
    /// Whether the orchestrator must stop the build now.
    ///
    /// Catastrophic build failures and every fault halt the build. Test
    /// failures and ordinary build failures let it keep collecting failures.
    #[must_use]
    pub fn is_catastrophe(&self) -> bool {
        match self {
            FailureRecord::BuildFailure(failure) => failure.catastrophic,
            FailureRecord::TestExecutionFailure(_) => false,
            FailureRecord::Fault(_) => true,
        }
    }

    /// Whether the diagnostic was already displayed.
    #[must_use]
    pub fn error_already_shown(&self) -> bool {
        match self {
            FailureRecord::BuildFailure(failure) => failure.error_already_shown,
            FailureRecord::TestExecutionFailure(_) | FailureRecord::Fault(_) => false,
        }
    }

    /// Short name of the variant, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            FailureRecord::BuildFailure(_) => "build-failure",
            FailureRecord::TestExecutionFailure(_) => "test-execution-failure",
            FailureRecord::Fault(Fault::Runtime(_)) => "runtime-fault",
            FailureRecord::Fault(Fault::Fatal(_)) => "fatal-error",
            FailureRecord::Fault(Fault::Unexpected(_)) => "unexpected-cause",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halt_decision() {
        let plain = FailureRecord::from(BuildFailedError::new("missing input"));
        assert!(!plain.is_catastrophe());
        assert!(!plain.error_already_shown());

        let catastrophic = FailureRecord::from(BuildFailedError {
            catastrophic: true,
            error_already_shown: true,
            ..BuildFailedError::new("disk full")
        });
        assert!(catastrophic.is_catastrophe());
        assert!(catastrophic.error_already_shown());

        let test = FailureRecord::from(TestExecError::new("test crashed"));
        assert!(!test.is_catastrophe());

        let fault = FailureRecord::from(Fault::from(RuntimeFault::new("index out of bounds")));
        assert!(fault.is_catastrophe());
        assert_eq!(fault.kind(), "runtime-fault");
    }

    #[test]
    fn test_display_is_transparent() {
        let record = FailureRecord::from(BuildFailedError::new("foo/BUILD:1:1 compile failed"));
        assert_eq!(record.to_string(), "foo/BUILD:1:1 compile failed");

        let unexpected = UnexpectedCause {
            message: "socket closed".to_string(),
            source: "socket closed".into(),
        };
        let record = FailureRecord::from(Fault::from(unexpected));
        assert_eq!(
            record.to_string(),
            "action terminated with unexpected exception: socket closed"
        );
        assert_eq!(record.kind(), "unexpected-cause");
    }
}
