#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! An extensible expectation engine for tests.
//!
//! `expect(value)` wraps a dynamic [`Value`] in an [`Assertion`]. Matchers are
//! looked up by name in a process-wide registry, so new matchers added with
//! [`extend`] are immediately callable.
//!
//! ```
//! use layered_expect::{asymmetric::object_containing, expect};
//! use serde_json::json;
//!
//! expect(json!([1, {"b": 2, "c": 3}]))
//!     .to_equal(vec![1.into(), object_containing(json!({"b": 2}))])
//!     .unwrap();
//! expect(5).not().to_be_greater_than(10).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`value`] - The dynamic values under test
//! - [`equality`] - Cycle-safe structural equality
//! - [`asymmetric`] - Wildcard matchers usable inside expected templates
//! - [`registry`] - Matcher registration and lookup
//! - [`format`] - Value printing, serializer plugins and diffs
//! - [`snapshot`] - Snapshot state machine and persistence seams
//! - [`state`] - Per-test matcher state
//! - [`config`] - TOML configuration

#[macro_use]
mod macros;

pub mod asymmetric;
mod assertion;
pub mod config;
pub mod equality;
pub mod errors;
pub mod format;
pub mod matchers;
mod promise;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod value;

pub use assertion::{expect, expect_with_message, Assertion, AsyncMode};
pub use config::{ExpectConfig, StringMatchMode};
pub use errors::{AssertionFailure, AsyncAssertionError, ExpectError, ExpectResult, SnapshotMismatch};
pub use format::{add_snapshot_serializer, FormatConfig, Serializer};
pub use promise::AsyncAssertion;
pub use registry::{
    extend, lookup, registered_matchers, Matcher, MatcherContext, MatcherResult, Matchers,
    SnapshotComparison,
};
pub use snapshot::{
    MemorySnapshotStore, SnapshotOutcome, SnapshotState, SnapshotStatus, SnapshotStore,
    SnapshotSummary, SnapshotUpdateMode,
};
pub use state::{
    assertions, get_state, has_assertions, reset_state, set_state, verify_assertions, MatcherState,
    StatePatch,
};
pub use value::{CallLog, CallResult, ErrorValue, Function, Promise, Record, Shared, Value};

#[cfg(test)]
mod tests {
    mod extend;
    mod properties;
    mod snapshots;
}
