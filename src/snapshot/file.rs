//! File snapshots: the stored form is a whole file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::errors::ExpectResult;
use crate::value::Shared;

/// Filesystem collaborator for `toMatchFileSnapshot`.
pub trait SnapshotFileSystem {
    /// Contents of `path`, or `None` if it does not exist.
    fn read(&self, path: &Path) -> ExpectResult<Option<String>>;

    fn write(&mut self, path: &Path, contents: &str) -> ExpectResult<()>;
}

/// In-memory file system. Clones share the same files.
#[derive(Clone, Default)]
pub struct MemorySnapshotFiles {
    files: Shared<BTreeMap<PathBuf, String>>,
}

impl MemorySnapshotFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl SnapshotFileSystem for MemorySnapshotFiles {
    fn read(&self, path: &Path) -> ExpectResult<Option<String>> {
        Ok(self.get(path))
    }

    fn write(&mut self, path: &Path, contents: &str) -> ExpectResult<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
