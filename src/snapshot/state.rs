//! Snapshot comparison and the write/update state machine.
//!
//! A snapshot key with no stored value is *new*. Checking it either writes
//! the received form ([`SnapshotStatus::Written`]) or, when writing is
//! disabled, fails ([`SnapshotStatus::NotWritten`]). A key with a stored
//! value is [`SnapshotStatus::Matched`] when the received form is identical,
//! and otherwise [`SnapshotStatus::Mismatched`], or
//! [`SnapshotStatus::Updated`] when every snapshot may be rewritten.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::file::SnapshotFileSystem;
use super::inline::{dedent, CallSite, InlineSnapshotWriter};
use super::store::SnapshotStore;
use crate::config::ExpectConfig;
use crate::errors::{ExpectError, ExpectResult};
use crate::format::{self, FormatConfig};
use crate::value::Value;

/// Which snapshots may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotUpdateMode {
    /// Never write; missing snapshots fail (CI).
    None,
    /// Write missing snapshots only.
    #[default]
    New,
    /// Write missing snapshots and overwrite mismatched ones.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotStatus {
    Written,
    NotWritten,
    Matched,
    Mismatched,
    Updated,
}

impl SnapshotStatus {
    pub fn is_pass(self) -> bool {
        !matches!(self, SnapshotStatus::Mismatched | SnapshotStatus::NotWritten)
    }
}

/// Result of one snapshot check.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOutcome {
    pub key: String,
    pub status: SnapshotStatus,
    /// Stored form before the check, if any.
    pub expected: Option<String>,
    pub received: String,
}

impl SnapshotOutcome {
    pub fn pass(&self) -> bool {
        self.status.is_pass()
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotSummary {
    pub added: usize,
    pub matched: usize,
    pub updated: usize,
    pub unmatched: usize,
    pub unchecked: usize,
    pub unchecked_keys: Vec<String>,
}

/// Per-suite snapshot bookkeeping.
pub struct SnapshotState {
    store: Box<dyn SnapshotStore>,
    update: SnapshotUpdateMode,
    format: FormatConfig,
    counters: HashMap<String, usize>,
    checked: HashSet<String>,
    inline_writer: Option<Box<dyn InlineSnapshotWriter>>,
    files: Option<Box<dyn SnapshotFileSystem>>,
    added: usize,
    matched: usize,
    updated: usize,
    unmatched: usize,
}

impl SnapshotState {
    pub fn new(store: impl SnapshotStore + 'static, update: SnapshotUpdateMode) -> Self {
        Self {
            store: Box::new(store),
            update,
            format: FormatConfig::snapshot(),
            counters: HashMap::new(),
            checked: HashSet::new(),
            inline_writer: None,
            files: None,
            added: 0,
            matched: 0,
            updated: 0,
            unmatched: 0,
        }
    }

    /// A state using the update mode and snapshot format of `config`.
    pub fn from_config(store: impl SnapshotStore + 'static, config: &ExpectConfig) -> Self {
        Self::new(store, config.snapshot_update).with_format(config.format.clone())
    }

    pub fn with_format(mut self, format: FormatConfig) -> Self {
        self.format = format;
        self
    }

    pub fn with_inline_writer(mut self, writer: impl InlineSnapshotWriter + 'static) -> Self {
        self.inline_writer = Some(Box::new(writer));
        self
    }

    pub fn with_file_system(mut self, files: impl SnapshotFileSystem + 'static) -> Self {
        self.files = Some(Box::new(files));
        self
    }

    pub fn update_mode(&self) -> SnapshotUpdateMode {
        self.update
    }

    /// Next key for `test_name`: `"{test} {n}"` or `"{test}: {hint} {n}"`,
    /// with `n` counting calls per test from 1.
    pub fn next_key(&mut self, test_name: &str, hint: Option<&str>) -> String {
        let count = self.counters.entry(test_name.to_string()).or_insert(0);
        *count += 1;
        match hint {
            Some(hint) if !hint.is_empty() => format!("{}: {} {}", test_name, hint, count),
            _ => format!("{} {}", test_name, count),
        }
    }

    /// Record a snapshot call that failed before comparison. The key is
    /// consumed and kept as checked so pruning leaves the stored snapshot.
    pub fn fail(&mut self, test_name: &str, hint: Option<&str>) -> String {
        let key = self.next_key(test_name, hint);
        self.checked.insert(key.clone());
        self.unmatched += 1;
        debug!("Snapshot {} failed before comparison", key);
        key
    }

    /// Forget per-test call counts. Called by the runner at test start.
    pub fn reset_counters(&mut self) {
        self.counters.clear();
    }

    /// Serialize with the registered plugins and this state's format.
    pub fn serialize(&self, value: &Value) -> String {
        format::serialize(value, &self.format)
    }

    /// Check `received` against the keyed store.
    pub fn match_snapshot(
        &mut self,
        test_name: &str,
        hint: Option<&str>,
        received: &Value,
    ) -> ExpectResult<SnapshotOutcome> {
        let key = self.next_key(test_name, hint);
        let received = self.serialize(received);
        let expected = self.store.read(&key)?;
        self.checked.insert(key.clone());

        let status = self.transition(&key, expected.as_deref(), &received)?;
        if matches!(status, SnapshotStatus::Written | SnapshotStatus::Updated) {
            self.store.write(&key, &received)?;
        }
        Ok(SnapshotOutcome {
            key,
            status,
            expected,
            received,
        })
    }

    /// Check `received` against an inline literal. `existing` is `None`
    /// when the call site carries no literal yet.
    pub fn match_inline(
        &mut self,
        test_name: &str,
        received: &Value,
        existing: Option<&str>,
        site: &CallSite,
    ) -> ExpectResult<SnapshotOutcome> {
        let key = self.next_key(test_name, None);
        let received = self.serialize(received);
        let expected = existing.map(dedent);

        let status = self.transition(&key, expected.as_deref(), &received)?;
        if matches!(status, SnapshotStatus::Written | SnapshotStatus::Updated) {
            let writer = self
                .inline_writer
                .as_mut()
                .ok_or_else(|| ExpectError::Store("no inline snapshot writer configured".to_string()))?;
            writer.write(site, &received)?;
        }
        Ok(SnapshotOutcome {
            key,
            status,
            expected,
            received,
        })
    }

    /// Check `received` against the contents of `path`. Strings are
    /// compared raw, other values serialized.
    pub fn match_file(&mut self, path: &Path, received: &Value) -> ExpectResult<SnapshotOutcome> {
        let key = path.display().to_string();
        let received = match received {
            Value::String(s) => s.clone(),
            other => self.serialize(other),
        };
        let files = self
            .files
            .as_ref()
            .ok_or_else(|| ExpectError::Store("no snapshot file system configured".to_string()))?;
        let expected = files.read(path)?;

        let status = self.transition(&key, expected.as_deref(), &received)?;
        if matches!(status, SnapshotStatus::Written | SnapshotStatus::Updated) {
            if let Some(files) = self.files.as_mut() {
                files.write(path, &received)?;
            }
        }
        Ok(SnapshotOutcome {
            key,
            status,
            expected,
            received,
        })
    }

    fn transition(&mut self, key: &str, expected: Option<&str>, received: &str) -> ExpectResult<SnapshotStatus> {
        let status = match expected {
            None if self.update == SnapshotUpdateMode::None => {
                self.unmatched += 1;
                SnapshotStatus::NotWritten
            }
            None => {
                self.added += 1;
                SnapshotStatus::Written
            }
            Some(stored) if normalize(stored) == normalize(received) => {
                self.matched += 1;
                SnapshotStatus::Matched
            }
            Some(_) if self.update == SnapshotUpdateMode::All => {
                self.updated += 1;
                SnapshotStatus::Updated
            }
            Some(_) => {
                self.unmatched += 1;
                SnapshotStatus::Mismatched
            }
        };
        debug!("Snapshot {} -> {:?}", key, status);
        Ok(status)
    }

    /// Stored keys not checked during this run.
    pub fn unchecked_keys(&self) -> ExpectResult<Vec<String>> {
        Ok(self
            .store
            .keys()?
            .into_iter()
            .filter(|key| !self.checked.contains(key))
            .collect())
    }

    /// Delete obsolete snapshots. Only allowed when every snapshot may be
    /// rewritten; otherwise nothing is removed.
    pub fn remove_unchecked(&mut self) -> ExpectResult<Vec<String>> {
        if self.update != SnapshotUpdateMode::All {
            return Ok(Vec::new());
        }
        let unchecked = self.unchecked_keys()?;
        for key in &unchecked {
            self.store.delete(key)?;
        }
        if !unchecked.is_empty() {
            info!("Removed {} obsolete snapshots", unchecked.len());
        }
        Ok(unchecked)
    }

    pub fn summary(&self) -> ExpectResult<SnapshotSummary> {
        let unchecked_keys = self.unchecked_keys()?;
        Ok(SnapshotSummary {
            added: self.added,
            matched: self.matched,
            updated: self.updated,
            unmatched: self.unmatched,
            unchecked: unchecked_keys.len(),
            unchecked_keys,
        })
    }

    /// Flush the store.
    pub fn save(&mut self) -> ExpectResult<()> {
        self.store.save()
    }
}

fn normalize(snapshot: &str) -> String {
    snapshot.replace("\r\n", "\n")
}
