//! Classification of terminated action tasks
//!
//! Precedence, first match wins:
//!
//! 1. a test execution failure anywhere in the cause chain
//! 2. an action execution failure
//! 3. a missing input file
//! 4. a runtime fault
//! 5. a fatal error
//! 6. anything else, as an unexpected-cause fault

use crate::failure::{BuildFailedError, FailureRecord, Fault, UnexpectedCause};
use crate::outcome::{ActionExecutionError, ActionFailure, TaskTermination};
use tracing::{debug, error, warn};

/// Work out what kind of failure terminated an action task.
///
/// Test failures win over whatever wraps them: a test action reports its
/// test's failure as its own execution failure, and unexpected causes are
/// searched through their `source()` chain. The wrapper's message is only
/// used when the action failure has no location.
///
/// A test execution failure that is itself the direct cause, with no
/// action failure around it, is accepted and classified as a
/// [`FailureRecord::TestExecutionFailure`] rather than rejected as an
/// illegal argument.
pub fn classify(termination: TaskTermination) -> FailureRecord {
    let TaskTermination { message, cause } = termination;

    let cause = match cause.into_test_failure() {
        Ok(test_failure) => {
            debug!(%test_failure, "Action terminated by test execution failure");
            return FailureRecord::TestExecutionFailure(test_failure);
        }
        Err(cause) => cause,
    };

    let kind = cause.kind();
    let record = match cause {
        ActionFailure::ActionExecution(error) => {
            FailureRecord::BuildFailure(build_failure(message, error))
        }
        ActionFailure::MissingInput(error) => {
            FailureRecord::BuildFailure(BuildFailedError::new(error.message))
        }
        ActionFailure::Runtime(fault) => {
            warn!(%fault, "Action terminated by runtime fault");
            FailureRecord::Fault(Fault::Runtime(fault))
        }
        ActionFailure::Fatal(fatal) => {
            warn!(%fatal, "Action terminated by fatal error");
            FailureRecord::Fault(Fault::Fatal(fatal))
        }
        ActionFailure::Unexpected(source) => {
            error!(%source, "Action terminated with a cause outside the pipeline contract");
            FailureRecord::Fault(Fault::Unexpected(UnexpectedCause {
                message: source.to_string(),
                source,
            }))
        }
        ActionFailure::TestExecution(test_failure) => {
            // into_test_failure() already took this branch
            FailureRecord::TestExecutionFailure(test_failure)
        }
    };

    debug!(cause = kind, record = record.kind(), "Classified action failure");
    record
}

fn build_failure(wrapper_message: String, error: ActionExecutionError) -> BuildFailedError {
    // Actions without an owner have no location
    let message = match &error.location {
        Some(location) => format!("{location} {}", error.message),
        None => wrapper_message,
    };

    BuildFailedError {
        message,
        catastrophic: error.catastrophe,
        action: error.action,
        root_causes: error.root_causes,
        error_already_shown: !error.show_error,
    }
}

/// Classify and return the failure as an error, for use with `?`.
///
/// # Errors
///
/// Always returns the classified [`FailureRecord`].
pub fn rethrow_cause(termination: TaskTermination) -> Result<(), FailureRecord> {
    Err(classify(termination))
}
