#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Filesystem persistence for `layered-expect` snapshots.
//!
//! - [`FileSnapshotStore`] keeps keyed snapshots of one test file in a
//!   `__snapshots__/<file>.snap.ron` document.
//! - [`FsSnapshotFiles`] backs `toMatchFileSnapshot` with real files.

pub mod error;
pub mod files;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use files::FsSnapshotFiles;
pub use store::{snapshot_path, FileSnapshotStore, SnapshotDocument, SNAPSHOT_VERSION};
