//! Snapshot matchers.
//!
//! These delegate to the [`SnapshotState`] installed in the matcher state
//! and translate its outcome into a verdict. They cannot be negated.

use std::path::Path;

use crate::equality::subset_equals;
use crate::errors::{ExpectError, ExpectResult};
use crate::format::diff::print_diff;
use crate::format::stringify;
use crate::registry::{MatcherContext, MatcherResult, SnapshotComparison};
use crate::snapshot::{SnapshotOutcome, SnapshotState, SnapshotStatus};
use crate::value::{Shared, Value};

use super::args::Args;
use super::throw::{thrown_message, thrown_value, DID_NOT_THROW};

const NOT_WRITTEN: &str = "New snapshot was not written. The update flag must be explicitly passed to write a new snapshot.\n\n\
This is likely because this test is run in a continuous integration (CI) environment in which snapshots are not written by default.";

struct SnapshotCall {
    state: Shared<SnapshotState>,
    test_name: String,
}

fn snapshot_call(ctx: &MatcherContext) -> ExpectResult<SnapshotCall> {
    if ctx.is_not {
        return Err(ExpectError::invalid_argument(
            ctx.name.clone(),
            "snapshot matchers cannot be used with not",
        ));
    }
    let state = ctx.state.snapshot_state.clone().ok_or(ExpectError::SnapshotStateMissing)?;
    Ok(SnapshotCall {
        state,
        test_name: ctx.state.current_test_name.clone().unwrap_or_default(),
    })
}

fn outcome_result(outcome: SnapshotOutcome) -> MatcherResult {
    let pass = outcome.pass();
    match (outcome.status, outcome.expected) {
        (SnapshotStatus::NotWritten, _) => {
            let key = outcome.key;
            let received = outcome.received;
            MatcherResult::new(pass, move || {
                format!("{}\n\nSnapshot: {}\nReceived: {}", NOT_WRITTEN, key, received)
            })
        }
        (SnapshotStatus::Mismatched, Some(expected)) => {
            let comparison = SnapshotComparison {
                key: outcome.key,
                expected,
                received: outcome.received,
            };
            let shown = comparison.clone();
            MatcherResult::new(pass, move || {
                format!(
                    "Snapshot `{}` mismatched\n\n{}",
                    shown.key,
                    print_diff(&shown.expected, &shown.received)
                )
            })
            .with_snapshot(comparison)
        }
        _ => {
            let key = outcome.key;
            MatcherResult::new(pass, move || format!("Snapshot `{}` matched", key))
        }
    }
}

/// Check the property matchers against `received` and return it with the
/// properties merged in, so the stored form prints the matchers.
fn apply_properties(
    ctx: &MatcherContext,
    received: &Value,
    properties: &Value,
) -> ExpectResult<Result<Value, MatcherResult>> {
    if !matches!(properties, Value::Object(_)) {
        return Err(ExpectError::invalid_argument(
            ctx.name.clone(),
            format!("expected properties must be an object\n\nExpected properties: {}", stringify(properties)),
        ));
    }
    if !matches!(received, Value::Object(_)) {
        return Err(ExpectError::invalid_argument(
            ctx.name.clone(),
            format!(
                "received value must be an object when the matcher has properties\n\nReceived: {}",
                stringify(received)
            ),
        ));
    }
    if !subset_equals(received, properties) {
        let expected = stringify(properties);
        let shown = stringify(received);
        return Ok(Err(MatcherResult::new(false, move || {
            format!("Expected properties: {}\nReceived value:      {}", expected, shown)
        })));
    }
    let merged = received.deep_clone();
    merge_into(&merged, properties);
    Ok(Ok(merged))
}

fn merge_into(target: &Value, properties: &Value) {
    let (target, properties) = match (target, properties) {
        (Value::Object(target), Value::Object(properties)) => (target, properties),
        _ => return,
    };
    let entries: Vec<(String, Value)> = properties
        .borrow()
        .fields
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    for (key, property) in entries {
        let existing = target.borrow().fields.get(&key).cloned();
        match existing {
            Some(nested @ Value::Object(_)) if matches!(property, Value::Object(_)) => {
                merge_into(&nested, &property)
            }
            _ => {
                target.borrow_mut().fields.insert(key, property);
            }
        }
    }
}

pub fn to_match_snapshot(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let call = snapshot_call(ctx)?;
    let args = Args::new(ctx, args);
    let (properties, hint) = match args.get(0) {
        Some(Value::String(hint)) => (None, Some(hint.as_str())),
        Some(properties) => (Some(properties), args.optional_string(1)?),
        None => (None, None),
    };

    let value = match properties {
        Some(properties) => match apply_properties(ctx, received, properties)? {
            Ok(merged) => merged,
            Err(failed) => {
                call.state.borrow_mut().fail(&call.test_name, hint);
                return Ok(failed);
            }
        },
        None => received.clone(),
    };
    let outcome = call.state.borrow_mut().match_snapshot(&call.test_name, hint, &value)?;
    Ok(outcome_result(outcome))
}

pub fn to_match_inline_snapshot(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let call = snapshot_call(ctx)?;
    let args = Args::new(ctx, args);
    let (properties, existing) = match args.get(0) {
        Some(Value::String(literal)) => (None, Some(literal.as_str())),
        Some(properties) => (Some(properties), args.optional_string(1)?),
        None => (None, args.optional_string(1)?),
    };

    let value = match properties {
        Some(properties) => match apply_properties(ctx, received, properties)? {
            Ok(merged) => merged,
            Err(failed) => {
                call.state.borrow_mut().fail(&call.test_name, None);
                return Ok(failed);
            }
        },
        None => received.clone(),
    };
    let site = ctx.call_site();
    let outcome = call
        .state
        .borrow_mut()
        .match_inline(&call.test_name, &value, existing, &site)?;
    Ok(outcome_result(outcome))
}

pub fn to_match_file_snapshot(ctx: &MatcherContext, received: &Value, args: &[Value]) -> ExpectResult<MatcherResult> {
    let call = snapshot_call(ctx)?;
    let path = Args::new(ctx, args).string(0)?;
    let outcome = call.state.borrow_mut().match_file(Path::new(path), received)?;
    Ok(outcome_result(outcome))
}

fn thrown_snapshot_value(ctx: &MatcherContext, received: &Value) -> ExpectResult<Option<Value>> {
    Ok(thrown_value(ctx, received)?.map(|thrown| Value::String(thrown_message(&thrown))))
}

pub fn to_throw_error_matching_snapshot(
    ctx: &MatcherContext,
    received: &Value,
    args: &[Value],
) -> ExpectResult<MatcherResult> {
    let call = snapshot_call(ctx)?;
    let hint = Args::new(ctx, args).optional_string(0)?;
    let message = match thrown_snapshot_value(ctx, received)? {
        Some(message) => message,
        None => {
            call.state.borrow_mut().fail(&call.test_name, hint);
            return Ok(MatcherResult::new(false, || DID_NOT_THROW.to_string()));
        }
    };
    let outcome = call.state.borrow_mut().match_snapshot(&call.test_name, hint, &message)?;
    Ok(outcome_result(outcome))
}

pub fn to_throw_error_matching_inline_snapshot(
    ctx: &MatcherContext,
    received: &Value,
    args: &[Value],
) -> ExpectResult<MatcherResult> {
    let call = snapshot_call(ctx)?;
    let existing = Args::new(ctx, args).optional_string(0)?;
    let message = match thrown_snapshot_value(ctx, received)? {
        Some(message) => message,
        None => {
            call.state.borrow_mut().fail(&call.test_name, None);
            return Ok(MatcherResult::new(false, || DID_NOT_THROW.to_string()));
        }
    };
    let site = ctx.call_site();
    let outcome = call
        .state
        .borrow_mut()
        .match_inline(&call.test_name, &message, existing, &site)?;
    Ok(outcome_result(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asymmetric::any;
    use crate::assertion::expect;
    use crate::snapshot::{MemorySnapshotStore, PendingInlineSnapshots, SnapshotUpdateMode};
    use crate::state::{reset_state, set_state, StatePatch};
    use serde_json::json;

    fn install(store: &MemorySnapshotStore, update: SnapshotUpdateMode) -> Shared<SnapshotState> {
        reset_state();
        let state = Shared::new(SnapshotState::new(store.clone(), update));
        set_state(StatePatch::new().test_name("renders").snapshot_state(state.clone()));
        state
    }

    #[test]
    fn test_writes_then_matches() {
        let store = MemorySnapshotStore::new();
        install(&store, SnapshotUpdateMode::New);
        expect(json!({"a": 1})).to_match_snapshot().unwrap();
        assert_eq!(store.get("renders 1").as_deref(), Some("{\n  \"a\": 1,\n}"));

        install(&store, SnapshotUpdateMode::None);
        expect(json!({"a": 1})).to_match_snapshot().unwrap();
    }

    #[test]
    fn test_mismatch_reports_diff() {
        let store = MemorySnapshotStore::with_entries(vec![("renders 1", "{\n  \"a\": 1,\n}")]);
        install(&store, SnapshotUpdateMode::New);
        let error = expect(json!({"a": 2})).to_match_snapshot().unwrap_err();
        match error {
            ExpectError::SnapshotMismatch(mismatch) => {
                assert_eq!(mismatch.key, "renders 1");
                assert!(mismatch.failure.diff.as_deref().unwrap().contains("+   \"a\": 2,"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(store.get("renders 1").as_deref(), Some("{\n  \"a\": 1,\n}"));
    }

    #[test]
    fn test_missing_snapshot_in_ci_mode() {
        let store = MemorySnapshotStore::new();
        install(&store, SnapshotUpdateMode::None);
        let error = expect(1).to_match_named_snapshot("count").unwrap_err();
        assert!(error.to_string().contains("New snapshot was not written"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_properties_are_checked_and_merged() {
        let store = MemorySnapshotStore::new();
        install(&store, SnapshotUpdateMode::New);
        expect(json!({"id": 7, "name": "x"}))
            .to_match_snapshot_properties(Value::object(vec![("id", any("Number"))]))
            .unwrap();
        insta::assert_snapshot!(store.get("renders 1").unwrap(), @r###"
        {
          "id": Any<Number>,
          "name": "x",
        }
        "###);

        let error = expect(json!({"id": "seven"}))
            .to_match_snapshot_properties(Value::object(vec![("id", any("Number"))]))
            .unwrap_err();
        assert!(error.to_string().contains("Expected properties"));
    }

    #[test]
    fn test_not_is_rejected() {
        let store = MemorySnapshotStore::new();
        install(&store, SnapshotUpdateMode::New);
        assert!(matches!(
            expect(1).not().to_match_snapshot(),
            Err(ExpectError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_missing_state() {
        reset_state();
        assert!(matches!(expect(1).to_match_snapshot(), Err(ExpectError::SnapshotStateMissing)));
    }

    #[test]
    fn test_inline_snapshot_written_and_matched() {
        let store = MemorySnapshotStore::new();
        let writer = PendingInlineSnapshots::new();
        reset_state();
        let state = Shared::new(SnapshotState::new(store, SnapshotUpdateMode::New).with_inline_writer(writer.clone()));
        set_state(StatePatch::new().test_name("inline").snapshot_state(state));

        expect("hi").to_match_inline_snapshot(None).unwrap();
        let pending = writer.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].1, "\"hi\"");
        assert!(pending[0].0.file.ends_with("snapshot.rs"));

        expect("hi").to_match_inline_snapshot(Some("\"hi\"")).unwrap();
        assert!(expect("ho").to_match_inline_snapshot(Some("\"hi\"")).is_err());
    }

    #[test]
    fn test_thrown_error_snapshot() {
        let store = MemorySnapshotStore::new();
        install(&store, SnapshotUpdateMode::New);
        let boom = Value::function("boom", |_| Err(Value::error("boom")));
        expect(&boom).to_throw_error_matching_snapshot().unwrap();
        assert_eq!(store.get("renders 1").as_deref(), Some("\"boom\""));

        let quiet = Value::function("quiet", |_| Ok(Value::Undefined));
        let error = expect(quiet).to_throw_error_matching_snapshot().unwrap_err();
        assert!(error.to_string().contains(DID_NOT_THROW));
    }

    #[test]
    fn test_failed_properties_keep_stored_snapshot() {
        let store = MemorySnapshotStore::with_entries(vec![("renders 1", "{\n  \"id\": Any<Number>,\n}")]);
        let state = install(&store, SnapshotUpdateMode::All);
        expect(json!({"id": "x"}))
            .to_match_snapshot_properties(Value::object(vec![("id", any("Number"))]))
            .unwrap_err();

        let summary = state.borrow().summary().unwrap();
        assert_eq!(summary.unmatched, 1);
        assert!(summary.unchecked_keys.is_empty());
        assert!(state.borrow_mut().remove_unchecked().unwrap().is_empty());
        assert!(store.get("renders 1").is_some());
    }

    #[test]
    fn test_missing_throw_consumes_key() {
        let store = MemorySnapshotStore::with_entries(vec![("renders 1", "\"boom\"")]);
        let state = install(&store, SnapshotUpdateMode::All);
        let quiet = Value::function("quiet", |_| Ok(Value::Undefined));
        expect(quiet).to_throw_error_matching_snapshot().unwrap_err();
        assert!(state.borrow_mut().remove_unchecked().unwrap().is_empty());
        assert_eq!(state.borrow().summary().unwrap().unmatched, 1);
    }
}
