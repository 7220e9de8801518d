//! Error types for assertions.
//!
//! Every failure carries rendered strings only, so errors can cross thread
//! boundaries even though the values they describe cannot.

use std::fmt;

use thiserror::Error;

use crate::format::message::{matcher_hint, HintOptions};

/// A failed matcher verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionFailure {
    pub matcher: String,
    pub is_not: bool,
    /// `"resolves"`, `"rejects"` or empty.
    pub promise: String,
    /// Full rendered message: hint, matcher message and diff.
    pub message: String,
    pub actual: Option<String>,
    pub expected: Option<String>,
    pub diff: Option<String>,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A snapshot comparison that failed, with both serialized forms.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotMismatch {
    pub failure: AssertionFailure,
    pub key: String,
    pub expected: String,
    pub received: String,
}

impl fmt::Display for SnapshotMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.failure.message)
    }
}

/// The wrapped promise settled the wrong way.
///
/// The settled value is kept in its printed form only; values hold `Rc`
/// handles and would make the error `!Send`.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncAssertionError {
    /// `.resolves` saw a rejection.
    Rejected {
        matcher: String,
        is_not: bool,
        reason: String,
    },
    /// `.rejects` saw a fulfillment.
    Fulfilled {
        matcher: String,
        is_not: bool,
        value: String,
    },
}

impl AsyncAssertionError {
    pub fn matcher(&self) -> &str {
        match self {
            AsyncAssertionError::Rejected { matcher, .. } | AsyncAssertionError::Fulfilled { matcher, .. } => {
                matcher
            }
        }
    }

    pub fn is_not(&self) -> bool {
        match self {
            AsyncAssertionError::Rejected { is_not, .. } | AsyncAssertionError::Fulfilled { is_not, .. } => *is_not,
        }
    }

    /// `expect(received).resolves[.not].name()` for this failure.
    pub fn hint(&self) -> String {
        let promise = match self {
            AsyncAssertionError::Rejected { .. } => "resolves",
            AsyncAssertionError::Fulfilled { .. } => "rejects",
        };
        let options = HintOptions {
            is_not: self.is_not(),
            promise: promise.to_string(),
            second_argument: None,
        };
        matcher_hint(self.matcher(), "received", "", &options)
    }
}

impl fmt::Display for AsyncAssertionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncAssertionError::Rejected { reason, .. } => write!(
                f,
                "{}\n\nReceived promise rejected instead of resolved\nRejected to value: {}",
                self.hint(),
                reason
            ),
            AsyncAssertionError::Fulfilled { value, .. } => write!(
                f,
                "{}\n\nReceived promise resolved instead of rejected\nResolved to value: {}",
                self.hint(),
                value
            ),
        }
    }
}

/// Errors raised by assertions and their collaborators.
#[derive(Debug, Error)]
pub enum ExpectError {
    /// No matcher is registered under this name.
    #[error("matcher not found: {name}")]
    MatcherNotFound { name: String },

    #[error("{0}")]
    AssertionFailed(AssertionFailure),

    #[error("{0}")]
    SnapshotMismatch(SnapshotMismatch),

    #[error("{0}")]
    Async(AsyncAssertionError),

    /// A matcher argument or received value has the wrong shape.
    #[error("{matcher}: {message}")]
    InvalidArgument { matcher: String, message: String },

    #[error("expected {expected} assertions to be called but received {actual} assertion calls")]
    AssertionCountMismatch { expected: usize, actual: usize },

    #[error("expected at least one assertion to be called but received none")]
    NoAssertions,

    #[error("snapshot state is not set for the current test")]
    SnapshotStateMissing,

    /// A persistence collaborator failed.
    #[error("snapshot store error: {0}")]
    Store(String),

    #[error("failed to load config {path}: {message}")]
    Config { path: String, message: String },
}

impl ExpectError {
    pub fn invalid_argument(matcher: impl Into<String>, message: impl Into<String>) -> Self {
        ExpectError::InvalidArgument {
            matcher: matcher.into(),
            message: message.into(),
        }
    }

    /// The assertion failure behind this error, including snapshot mismatches.
    pub fn failure(&self) -> Option<&AssertionFailure> {
        match self {
            ExpectError::AssertionFailed(failure) => Some(failure),
            ExpectError::SnapshotMismatch(mismatch) => Some(&mismatch.failure),
            _ => None,
        }
    }
}

/// Result type for assertion operations.
pub type ExpectResult<T> = Result<T, ExpectError>;
