use layered_expect::{
    expect, reset_state, set_state, ExpectError, Shared, SnapshotState, SnapshotStatus,
    SnapshotStore, SnapshotUpdateMode, StatePatch,
};
use layered_expect_fs::{snapshot_path, FileSnapshotStore, FsSnapshotFiles};
use serde_json::json;
use tempfile::TempDir;

fn run(test_file: &std::path::Path, update: SnapshotUpdateMode) -> Shared<SnapshotState> {
    reset_state();
    let store = FileSnapshotStore::for_test_file(test_file).unwrap();
    let state = Shared::new(SnapshotState::new(store, update));
    set_state(StatePatch::new().test_name("profile").snapshot_state(state.clone()));
    state
}

#[test]
fn snapshots_survive_a_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let test_file = dir.path().join("profile.rs");

    let state = run(&test_file, SnapshotUpdateMode::New);
    expect(json!({"name": "Ada", "langs": ["en", "fr"]})).to_match_snapshot().unwrap();
    state.borrow_mut().save().unwrap();
    assert!(snapshot_path(&test_file).exists());

    let state = run(&test_file, SnapshotUpdateMode::None);
    expect(json!({"name": "Ada", "langs": ["en", "fr"]})).to_match_snapshot().unwrap();
    assert_eq!(state.borrow().summary().unwrap().matched, 1);

    run(&test_file, SnapshotUpdateMode::None);
    let error = expect(json!({"name": "Bob", "langs": ["en", "fr"]}))
        .to_match_snapshot()
        .unwrap_err();
    assert!(matches!(error, ExpectError::SnapshotMismatch(_)));
}

#[test]
fn update_all_rewrites_and_prunes() {
    let dir = TempDir::new().unwrap();
    let test_file = dir.path().join("update.rs");

    let state = run(&test_file, SnapshotUpdateMode::New);
    expect(1).to_match_snapshot().unwrap();
    expect(2).to_match_snapshot().unwrap();
    state.borrow_mut().save().unwrap();

    let state = run(&test_file, SnapshotUpdateMode::All);
    expect(10).to_match_snapshot().unwrap();
    let removed = state.borrow_mut().remove_unchecked().unwrap();
    assert_eq!(removed, vec!["profile 2".to_string()]);
    state.borrow_mut().save().unwrap();

    let store = FileSnapshotStore::for_test_file(&test_file).unwrap();
    assert_eq!(store.keys().unwrap(), vec!["profile 1".to_string()]);
    assert_eq!(store.read("profile 1").unwrap().as_deref(), Some("10"));
}

#[test]
fn file_snapshots_write_raw_strings() {
    let dir = TempDir::new().unwrap();
    let mut state = SnapshotState::new(
        FileSnapshotStore::open(dir.path().join("unused.snap.ron")).unwrap(),
        SnapshotUpdateMode::New,
    )
    .with_file_system(FsSnapshotFiles::new(dir.path()));

    let path = std::path::Path::new("fixtures/page.html");
    let first = state.match_file(path, &"<h1>hi</h1>".into()).unwrap();
    assert_eq!(first.status, SnapshotStatus::Written);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("fixtures/page.html")).unwrap(),
        "<h1>hi</h1>"
    );

    let second = state.match_file(path, &"<h1>bye</h1>".into()).unwrap();
    assert_eq!(second.status, SnapshotStatus::Mismatched);
}
