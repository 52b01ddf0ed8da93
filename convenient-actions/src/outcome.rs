//! Failure outcomes reported by the action execution pipeline
//!
//! The pipeline terminates a failed action task with a [`TaskTermination`]
//! whose cause is one of the closed set of [`ActionFailure`] shapes. The
//! shapes mirror what the executor can actually produce; anything else
//! arrives as [`ActionFailure::Unexpected`].

use convenient_target::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

/// Position in a build file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Build file path
    pub path: PathBuf,
    /// 1-based line
    pub line: Option<u32>,
    /// 1-based column, only meaningful with a line
    pub column: Option<u32>,
}

impl Location {
    /// Location of a whole file.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            line: None,
            column: None,
        }
    }

    /// Location of a line and column in a file.
    pub fn at(path: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}

/// The action a failure is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionRef {
    /// Action mnemonic, e.g. `CppCompile`
    pub mnemonic: String,
    /// Rule that owns the action, if any
    pub owner: Option<Label>,
    /// First declared output
    pub primary_output: PathBuf,
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.mnemonic, self.primary_output.display())?;
        if let Some(owner) = &self.owner {
            write!(f, " ({owner})")?;
        }
        Ok(())
    }
}

/// A test action ran and its test failed to execute.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TestExecError {
    /// Diagnostic text
    pub message: String,
}

impl TestExecError {
    /// Create a test execution error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An action failed to execute.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ActionExecutionError {
    /// Diagnostic text
    pub message: String,
    /// Build file location of the owning rule
    pub location: Option<Location>,
    /// Whether the build should stop scheduling further work
    pub catastrophe: bool,
    /// Failed action, if the action has an owner
    pub action: Option<ActionRef>,
    /// Targets the failure is ultimately attributed to
    pub root_causes: BTreeSet<Label>,
    /// Whether this error still needs to be shown to the user
    pub show_error: bool,
    /// What made the action fail, when the executor knows
    #[source]
    pub cause: Option<Box<ActionFailure>>,
}

impl ActionExecutionError {
    /// A non-catastrophic failure that still needs to be shown.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            catastrophe: false,
            action: None,
            root_causes: BTreeSet::new(),
            show_error: true,
            cause: None,
        }
    }

    /// Attach the owning rule's location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Mark the failure as catastrophic.
    #[must_use]
    pub fn catastrophic(mut self) -> Self {
        self.catastrophe = true;
        self
    }

    /// Attribute the failure to an action.
    #[must_use]
    pub fn with_action(mut self, action: ActionRef) -> Self {
        self.action = Some(action);
        self
    }

    /// Add root cause labels.
    #[must_use]
    pub fn with_root_causes(mut self, root_causes: impl IntoIterator<Item = Label>) -> Self {
        self.root_causes.extend(root_causes);
        self
    }

    /// Record that the executor already showed this error.
    #[must_use]
    pub fn already_shown(mut self) -> Self {
        self.show_error = false;
        self
    }

    /// Record what made the action fail.
    #[must_use]
    pub fn caused_by(mut self, cause: impl Into<ActionFailure>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }
}

/// A declared input of an action does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct MissingInputFileError {
    /// Diagnostic text
    pub message: String,
    /// Build file location that declared the input
    pub location: Option<Location>,
}

impl MissingInputFileError {
    /// Create a missing-input error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
        }
    }
}

/// A bug surfaced while running the action, such as a broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RuntimeFault {
    /// Diagnostic text
    pub message: String,
}

impl RuntimeFault {
    /// Create a runtime fault.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// An unrecoverable condition of the build process itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FatalError {
    /// Diagnostic text
    pub message: String,
}

impl FatalError {
    /// Create a fatal error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Why an action task terminated.
#[derive(Debug, thiserror::Error)]
pub enum ActionFailure {
    /// The test run by the action failed to execute
    #[error(transparent)]
    TestExecution(#[from] TestExecError),

    /// The action failed to execute
    #[error(transparent)]
    ActionExecution(#[from] ActionExecutionError),

    /// An input was missing
    #[error(transparent)]
    MissingInput(#[from] MissingInputFileError),

    /// A bug in the engine
    #[error(transparent)]
    Runtime(#[from] RuntimeFault),

    /// An unrecoverable system condition
    #[error(transparent)]
    Fatal(#[from] FatalError),

    /// A failure the pipeline is not specified to produce
    #[error(transparent)]
    Unexpected(Box<dyn StdError + Send + Sync>),
}

impl ActionFailure {
    /// Wrap an arbitrary error the pipeline did not expect.
    pub fn unexpected(error: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        ActionFailure::Unexpected(error.into())
    }

    /// Short name of the failure shape, for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            ActionFailure::TestExecution(_) => "test-execution",
            ActionFailure::ActionExecution(_) => "action-execution",
            ActionFailure::MissingInput(_) => "missing-input",
            ActionFailure::Runtime(_) => "runtime-fault",
            ActionFailure::Fatal(_) => "fatal",
            ActionFailure::Unexpected(_) => "unexpected",
        }
    }

    /// Extract a test execution failure from this failure or anything
    /// wrapping it.
    ///
    /// A test action reports its test failure wrapped in its own execution
    /// failure; the wrapping depth is not fixed. Unexpected causes are
    /// searched through their `source()` chain.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged when no test execution failure is found.
    pub fn into_test_failure(self) -> Result<TestExecError, Self> {
        match self {
            ActionFailure::TestExecution(error) => Ok(error),
            ActionFailure::ActionExecution(mut error) => match error.cause.take() {
                Some(cause) => match (*cause).into_test_failure() {
                    Ok(test_failure) => Ok(test_failure),
                    Err(cause) => {
                        error.cause = Some(Box::new(cause));
                        Err(ActionFailure::ActionExecution(error))
                    }
                },
                None => Err(ActionFailure::ActionExecution(error)),
            },
            ActionFailure::Unexpected(error) => {
                let first: &(dyn StdError + 'static) = &*error;
                let found = std::iter::successors(Some(first), |&e| e.source())
                    .find_map(test_failure_in)
                    .cloned();
                match found {
                    Some(test_failure) => Ok(test_failure),
                    None => Err(ActionFailure::Unexpected(error)),
                }
            }
            other => Err(other),
        }
    }
}

fn test_failure_in<'e>(error: &'e (dyn StdError + 'static)) -> Option<&'e TestExecError> {
    match error.downcast_ref::<ActionFailure>() {
        Some(ActionFailure::TestExecution(test_failure)) => Some(test_failure),
        _ => error.downcast_ref::<TestExecError>(),
    }
}

/// A failed action task as handed to the build orchestrator.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TaskTermination {
    /// Message of the task wrapper
    pub message: String,
    /// Why the task terminated
    #[source]
    pub cause: ActionFailure,
}

impl TaskTermination {
    /// Wrap a failure cause.
    pub fn new(message: impl Into<String>, cause: impl Into<ActionFailure>) -> Self {
        Self {
            message: message.into(),
            cause: cause.into(),
        }
    }
}
