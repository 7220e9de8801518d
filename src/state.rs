//! Per-test matcher state.
//!
//! The runner owns the lifecycle: it injects the test name and snapshot
//! state with [`set_state`] before a test, validates assertion counts with
//! [`verify_assertions`] after it, and calls [`reset_state`] in between.
//! State is thread-local; the Rust test harness runs each test on its own
//! thread.

use std::cell::RefCell;

use tracing::trace;

use crate::config::ExpectConfig;
use crate::errors::{ExpectError, ExpectResult};
use crate::snapshot::SnapshotState;
use crate::value::Shared;

/// Context read by matchers.
#[derive(Clone, Default)]
pub struct MatcherState {
    /// Environment id supplied by the runner (`node`, `jsdom`, ...).
    pub environment: String,
    pub current_test_name: Option<String>,
    pub snapshot_state: Option<Shared<SnapshotState>>,
    pub assertion_calls: usize,
    pub expected_assertions_number: Option<usize>,
    pub is_expecting_assertions: bool,
    pub config: ExpectConfig,
}

/// Partial update merged by [`set_state`]. Unset fields are left alone.
#[derive(Default)]
pub struct StatePatch {
    pub environment: Option<String>,
    pub current_test_name: Option<String>,
    pub snapshot_state: Option<Shared<SnapshotState>>,
    pub assertion_calls: Option<usize>,
    pub expected_assertions_number: Option<Option<usize>>,
    pub is_expecting_assertions: Option<bool>,
    pub config: Option<ExpectConfig>,
}

impl StatePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn test_name(mut self, name: impl Into<String>) -> Self {
        self.current_test_name = Some(name.into());
        self
    }

    pub fn snapshot_state(mut self, state: Shared<SnapshotState>) -> Self {
        self.snapshot_state = Some(state);
        self
    }

    pub fn assertion_calls(mut self, calls: usize) -> Self {
        self.assertion_calls = Some(calls);
        self
    }

    pub fn expected_assertions(mut self, expected: Option<usize>) -> Self {
        self.expected_assertions_number = Some(expected);
        self
    }

    pub fn expecting_assertions(mut self, expecting: bool) -> Self {
        self.is_expecting_assertions = Some(expecting);
        self
    }

    pub fn config(mut self, config: ExpectConfig) -> Self {
        self.config = Some(config);
        self
    }
}

thread_local! {
    static STATE: RefCell<MatcherState> = RefCell::new(MatcherState::default());
}

/// A copy of the current state. Snapshot state is shared, not copied.
pub fn get_state() -> MatcherState {
    STATE.with(|state| state.borrow().clone())
}

/// Merge `patch` into the current state.
pub fn set_state(patch: StatePatch) {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        if let Some(environment) = patch.environment {
            state.environment = environment;
        }
        if let Some(name) = patch.current_test_name {
            state.current_test_name = Some(name);
        }
        if let Some(snapshot_state) = patch.snapshot_state {
            state.snapshot_state = Some(snapshot_state);
        }
        if let Some(calls) = patch.assertion_calls {
            state.assertion_calls = calls;
        }
        if let Some(expected) = patch.expected_assertions_number {
            state.expected_assertions_number = expected;
        }
        if let Some(expecting) = patch.is_expecting_assertions {
            state.is_expecting_assertions = expecting;
        }
        if let Some(config) = patch.config {
            state.config = config;
        }
    });
}

/// Restore the default state.
pub fn reset_state() {
    STATE.with(|state| *state.borrow_mut() = MatcherState::default());
}

/// Require exactly `expected` assertions in the current test.
pub fn assertions(expected: usize) {
    STATE.with(|state| state.borrow_mut().expected_assertions_number = Some(expected));
}

/// Require at least one assertion in the current test.
pub fn has_assertions() {
    STATE.with(|state| state.borrow_mut().is_expecting_assertions = true);
}

/// Check the counters set up by [`assertions`] and [`has_assertions`].
pub fn verify_assertions() -> ExpectResult<()> {
    let state = get_state();
    if let Some(expected) = state.expected_assertions_number {
        if state.assertion_calls != expected {
            return Err(ExpectError::AssertionCountMismatch {
                expected,
                actual: state.assertion_calls,
            });
        }
    }
    if state.is_expecting_assertions && state.assertion_calls == 0 {
        return Err(ExpectError::NoAssertions);
    }
    Ok(())
}

pub(crate) fn increment_assertion_calls() {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        state.assertion_calls += 1;
        trace!("Assertion call {}", state.assertion_calls);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_state_merges() {
        reset_state();
        set_state(StatePatch::new().environment("node").test_name("a"));
        set_state(StatePatch::new().test_name("b"));
        let state = get_state();
        assert_eq!(state.environment, "node");
        assert_eq!(state.current_test_name.as_deref(), Some("b"));
        reset_state();
        assert!(get_state().current_test_name.is_none());
    }

    #[test]
    fn test_verify_assertion_count() {
        reset_state();
        assertions(2);
        increment_assertion_calls();
        assert!(matches!(
            verify_assertions(),
            Err(ExpectError::AssertionCountMismatch { expected: 2, actual: 1 })
        ));
        increment_assertion_calls();
        assert!(verify_assertions().is_ok());
    }

    #[test]
    fn test_verify_has_assertions() {
        reset_state();
        has_assertions();
        assert!(matches!(verify_assertions(), Err(ExpectError::NoAssertions)));
        increment_assertion_calls();
        assert!(verify_assertions().is_ok());
    }
}
