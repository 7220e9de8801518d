//! Keyed snapshots stored as one RON document per test file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use layered_expect::{ExpectResult, SnapshotStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Format version written to every document.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk form of a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub version: u32,
    #[serde(default)]
    pub snapshots: BTreeMap<String, String>,
}

impl SnapshotDocument {
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, config)
    }

    pub fn from_ron_string(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }
}

/// `<dir>/__snapshots__/<file name>.snap.ron` for a test file.
pub fn snapshot_path(test_file: &Path) -> PathBuf {
    let dir = test_file.parent().unwrap_or_else(|| Path::new(""));
    let name = test_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join("__snapshots__").join(format!("{}.snap.ron", name))
}

/// A [`SnapshotStore`] over one RON document.
///
/// Writes are buffered in memory until [`SnapshotStore::save`]. Saving an
/// empty store removes the document.
#[derive(Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
    snapshots: BTreeMap<String, String>,
    dirty: bool,
}

impl FileSnapshotStore {
    /// Load the document at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let snapshots = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            let document = SnapshotDocument::from_ron_string(&content).map_err(|e| StoreError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;
            if document.version != SNAPSHOT_VERSION {
                return Err(StoreError::Version {
                    path,
                    found: document.version,
                    expected: SNAPSHOT_VERSION,
                });
            }
            debug!("Loaded {} snapshots from {}", document.snapshots.len(), path.display());
            document.snapshots
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            snapshots,
            dirty: false,
        })
    }

    /// Open the store that belongs to `test_file`.
    pub fn for_test_file(test_file: &Path) -> StoreResult<Self> {
        Self::open(snapshot_path(test_file))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn flush(&mut self) -> StoreResult<()> {
        if !self.dirty {
            return Ok(());
        }
        if self.snapshots.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|source| StoreError::Write {
                    path: self.path.clone(),
                    source,
                })?;
                info!("Removed empty snapshot file {}", self.path.display());
            }
        } else {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            let document = SnapshotDocument {
                version: SNAPSHOT_VERSION,
                snapshots: self.snapshots.clone(),
            };
            let content = document
                .to_ron_string()
                .map_err(|e| StoreError::Serialize(e.to_string()))?;
            fs::write(&self.path, content).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
            info!("Wrote {} snapshots to {}", self.snapshots.len(), self.path.display());
        }
        self.dirty = false;
        Ok(())
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn read(&self, key: &str) -> ExpectResult<Option<String>> {
        Ok(self.snapshots.get(key).cloned())
    }

    fn write(&mut self, key: &str, snapshot: &str) -> ExpectResult<()> {
        self.snapshots.insert(key.to_string(), snapshot.to_string());
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> ExpectResult<()> {
        if self.snapshots.remove(key).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    fn keys(&self) -> ExpectResult<Vec<String>> {
        Ok(self.snapshots.keys().cloned().collect())
    }

    fn save(&mut self) -> ExpectResult<()> {
        Ok(self.flush()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_path() {
        assert_eq!(
            snapshot_path(Path::new("tests/render.rs")),
            PathBuf::from("tests/__snapshots__/render.rs.snap.ron")
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::open(dir.path().join("none.snap.ron")).unwrap();
        assert!(store.keys().unwrap().is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("__snapshots__").join("a.rs.snap.ron");

        let mut store = FileSnapshotStore::open(&path).unwrap();
        store.write("renders 1", "{\n  \"a\": 1,\n}").unwrap();
        store.write("renders 2", "\"quote \\\" and \\\\ slash\"").unwrap();
        assert!(!path.exists());
        store.save().unwrap();
        assert!(path.exists());

        let reloaded = FileSnapshotStore::open(&path).unwrap();
        assert_eq!(reloaded.keys().unwrap(), vec!["renders 1", "renders 2"]);
        assert_eq!(
            reloaded.read("renders 2").unwrap().as_deref(),
            Some("\"quote \\\" and \\\\ slash\"")
        );
    }

    #[test]
    fn test_empty_store_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.snap.ron");
        let mut store = FileSnapshotStore::open(&path).unwrap();
        store.write("k 1", "1").unwrap();
        store.save().unwrap();
        store.delete("k 1").unwrap();
        store.save().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.snap.ron");
        fs::write(&path, "(version: 9, snapshots: {})").unwrap();
        assert!(matches!(
            FileSnapshotStore::open(&path),
            Err(StoreError::Version { found: 9, .. })
        ));
    }

    #[test]
    fn test_parse_errors_surface() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.snap.ron");
        fs::write(&path, "not ron at all {").unwrap();
        assert!(matches!(FileSnapshotStore::open(&path), Err(StoreError::Parse { .. })));
    }
}
