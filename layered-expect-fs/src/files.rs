//! Real files for `toMatchFileSnapshot`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use layered_expect::snapshot::SnapshotFileSystem;
use layered_expect::ExpectResult;
use tracing::debug;

use crate::error::StoreError;

/// Resolves relative snapshot paths against a base directory, usually the
/// directory of the test file.
#[derive(Debug, Clone)]
pub struct FsSnapshotFiles {
    base: PathBuf,
}

impl FsSnapshotFiles {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

impl SnapshotFileSystem for FsSnapshotFiles {
    fn read(&self, path: &Path) -> ExpectResult<Option<String>> {
        let path = self.resolve(path);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read { path, source }.into()),
        }
    }

    fn write(&mut self, path: &Path, contents: &str) -> ExpectResult<()> {
        let path = self.resolve(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, contents).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote file snapshot {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_none() {
        let dir = TempDir::new().unwrap();
        let files = FsSnapshotFiles::new(dir.path());
        assert_eq!(files.read(Path::new("out/missing.txt")).unwrap(), None);
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = TempDir::new().unwrap();
        let mut files = FsSnapshotFiles::new(dir.path());
        files.write(Path::new("out/page.html"), "<p>hi</p>").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("out/page.html")).unwrap(),
            "<p>hi</p>"
        );
        assert_eq!(files.read(Path::new("out/page.html")).unwrap().as_deref(), Some("<p>hi</p>"));
    }
}
