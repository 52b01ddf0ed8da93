//! Classification of action execution failures.
//!
//! When an action task fails inside the parallel execution pipeline, the
//! orchestrator needs to know what went wrong before deciding whether to
//! stop the build:
//!
//! - a test failed to execute: expected, keep going
//! - an action failed or an input was missing: a build failure, which may be
//!   catastrophic
//! - the engine itself broke: a fault, always surfaced
//!
//! [`classify`] turns a [`TaskTermination`] into exactly one
//! [`FailureRecord`].
//!
//! # Example
//!
//! ```
//! use convenient_actions::{classify, ActionExecutionError, FailureRecord, TaskTermination};
//!
//! let termination = TaskTermination::new(
//!     "Executing genrule //foo:gen failed",
//!     ActionExecutionError::new("command exited with status 1").catastrophic(),
//! );
//!
//! let record = classify(termination);
//! assert!(record.is_catastrophe());
//! assert!(matches!(record, FailureRecord::BuildFailure(_)));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(unused_results)]

pub mod classify;
pub mod failure;
pub mod outcome;

pub use classify::{classify, rethrow_cause};
pub use failure::{BuildFailedError, FailureRecord, Fault, UnexpectedCause};
pub use outcome::{
    ActionExecutionError, ActionFailure, ActionRef, FatalError, Location, MissingInputFileError,
    RuntimeFault, TaskTermination, TestExecError,
};
