//! Snapshot testing.
//!
//! [`SnapshotState`] owns the comparison rules; persistence is delegated to
//! collaborators: a [`SnapshotStore`] for keyed snapshots, an
//! [`InlineSnapshotWriter`] for inline literals and a
//! [`SnapshotFileSystem`] for whole-file snapshots.

pub mod file;
pub mod inline;
mod state;
pub mod store;

pub use file::{MemorySnapshotFiles, SnapshotFileSystem};
pub use inline::{dedent, CallSite, InlineSnapshotWriter, PendingInlineSnapshots};
pub use state::{SnapshotOutcome, SnapshotState, SnapshotStatus, SnapshotSummary, SnapshotUpdateMode};
pub use store::{MemorySnapshotStore, SnapshotStore};
