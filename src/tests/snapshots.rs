use serde_json::json;

use crate::format::{FormatConfig, Printer, Refs};
use crate::snapshot::{PendingInlineSnapshots, MemorySnapshotFiles};
use crate::{
    add_snapshot_serializer, expect, reset_state, set_state, ExpectError, MemorySnapshotStore, Serializer,
    Shared, SnapshotState, SnapshotUpdateMode, StatePatch, Value,
};

fn start(store: &MemorySnapshotStore, update: SnapshotUpdateMode, test: &str) -> Shared<SnapshotState> {
    reset_state();
    let state = Shared::new(SnapshotState::new(store.clone(), update));
    set_state(StatePatch::new().test_name(test).snapshot_state(state.clone()));
    state
}

#[test]
fn unchanged_values_match_on_rerun() {
    let store = MemorySnapshotStore::new();
    let state = start(&store, SnapshotUpdateMode::New, "idempotent");
    expect(json!({"n": 1})).to_match_snapshot().unwrap();
    expect(json!({"n": 2})).to_match_snapshot().unwrap();
    assert_eq!(state.borrow().summary().unwrap().added, 2);

    let state = start(&store, SnapshotUpdateMode::New, "idempotent");
    expect(json!({"n": 1})).to_match_snapshot().unwrap();
    expect(json!({"n": 2})).to_match_snapshot().unwrap();
    let summary = state.borrow().summary().unwrap();
    assert_eq!(summary.matched, 2);
    assert_eq!(summary.added, 0);
}

#[test]
fn changed_values_mismatch_or_update() {
    let store = MemorySnapshotStore::new();
    start(&store, SnapshotUpdateMode::New, "changes");
    expect("first").to_match_snapshot().unwrap();

    start(&store, SnapshotUpdateMode::New, "changes");
    let error = expect("second").to_match_snapshot().unwrap_err();
    match error {
        ExpectError::SnapshotMismatch(mismatch) => {
            assert_eq!(mismatch.expected, "\"first\"");
            assert_eq!(mismatch.received, "\"second\"");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let state = start(&store, SnapshotUpdateMode::All, "changes");
    expect("second").to_match_snapshot().unwrap();
    assert_eq!(state.borrow().summary().unwrap().updated, 1);

    let state = start(&store, SnapshotUpdateMode::None, "changes");
    expect("second").to_match_snapshot().unwrap();
    assert_eq!(state.borrow().summary().unwrap().matched, 1);
}

#[test]
fn named_snapshots_have_their_own_keys() {
    let store = MemorySnapshotStore::new();
    start(&store, SnapshotUpdateMode::New, "named");
    expect(1).to_match_named_snapshot("first").unwrap();
    expect(2).to_match_snapshot().unwrap();
    assert_eq!(store.get("named: first 1").as_deref(), Some("1"));
    assert_eq!(store.get("named 2").as_deref(), Some("2"));
}

struct Money;

impl Serializer for Money {
    fn test(&self, value: &Value) -> bool {
        value.type_name() == "Money"
    }

    fn serialize(
        &self,
        value: &Value,
        config: &FormatConfig,
        indentation: &str,
        depth: usize,
        refs: &Refs,
        printer: &dyn Printer,
    ) -> String {
        let amount = value.property("cents").and_then(|cents| cents.as_f64()).unwrap_or(0.0) / 100.0;
        let currency = value.property("currency").unwrap_or(Value::Undefined);
        format!(
            "Money<{:.2} {}>",
            amount,
            printer.print(&currency, config, indentation, depth, refs)
        )
    }
}

#[test]
fn serializer_plugins_shape_stored_snapshots() {
    add_snapshot_serializer(Money);
    let store = MemorySnapshotStore::new();
    start(&store, SnapshotUpdateMode::New, "plugins");
    let price = Value::instance("Money", vec![("cents", Value::from(1250)), ("currency", Value::from("EUR"))]);
    expect(Value::object(vec![("price", price)])).to_match_snapshot().unwrap();
    insta::assert_snapshot!(store.get("plugins 1").unwrap(), @r###"
    {
      "price": Money<12.50 "EUR">,
    }
    "###);
}

#[test]
fn inline_and_file_snapshots_share_the_state_machine() {
    let writer = PendingInlineSnapshots::new();
    let files = MemorySnapshotFiles::new();
    reset_state();
    let state = Shared::new(
        SnapshotState::new(MemorySnapshotStore::new(), SnapshotUpdateMode::New)
            .with_inline_writer(writer.clone())
            .with_file_system(files.clone()),
    );
    set_state(StatePatch::new().test_name("variants").snapshot_state(state));

    expect(json!([1])).to_match_inline_snapshot(None).unwrap();
    assert_eq!(writer.pending()[0].1, "[\n  1,\n]");
    expect(json!([1]))
        .to_match_inline_snapshot(Some(
            "
            [
              1,
            ]
            ",
        ))
        .unwrap();

    expect("<svg/>").to_match_file_snapshot("icons/dot.svg").unwrap();
    assert_eq!(files.get("icons/dot.svg").as_deref(), Some("<svg/>"));
    assert!(expect("<svg></svg>").to_match_file_snapshot("icons/dot.svg").is_err());
}
