//! Sinks for non-fatal resolution errors
//!
//! A query keeps walking the graph when a label fails to resolve; the
//! failure is handed to an [`ErrorSink`] together with the query expression
//! that was being evaluated.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Receives resolution errors while a query runs.
///
/// Called concurrently from every worker evaluating the query.
pub trait ErrorSink: Send + Sync {
    /// Record an error attributed to the `caller` query expression.
    fn report(&self, caller: &dyn fmt::Display, message: String);
}

/// An error recorded by [`CollectingErrorSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    /// Query expression that hit the error
    pub caller: String,
    /// Error message, prefix included
    pub message: String,
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.caller, self.message)
    }
}

/// Collects reported errors in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingErrorSink {
    errors: Mutex<Vec<ReportedError>>,
}

impl CollectingErrorSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ReportedError>> {
        // Vec::push leaves the buffer consistent even if a holder panicked.
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the errors reported so far.
    #[must_use]
    pub fn errors(&self) -> Vec<ReportedError> {
        self.lock().clone()
    }

    /// Remove and return all reported errors.
    pub fn take(&self) -> Vec<ReportedError> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of errors reported so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl ErrorSink for CollectingErrorSink {
    fn report(&self, caller: &dyn fmt::Display, message: String) {
        let error = ReportedError {
            caller: caller.to_string(),
            message,
        };
        self.lock().push(error);
    }
}

/// Emits every reported error as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, caller: &dyn fmt::Display, message: String) {
        tracing::warn!(caller = %caller, "{message}");
    }
}
