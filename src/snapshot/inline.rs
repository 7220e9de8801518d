//! Inline snapshots: the stored form lives in the test source.

use std::fmt;
use std::panic::Location;

use crate::errors::ExpectResult;
use crate::value::Shared;

/// Where `expect(..)` was called.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl From<&Location<'_>> for CallSite {
    fn from(location: &Location<'_>) -> Self {
        Self {
            file: location.file().to_string(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Source-rewriting collaborator for inline snapshots.
pub trait InlineSnapshotWriter {
    /// Record that the literal at `site` should become `snapshot`.
    fn write(&mut self, site: &CallSite, snapshot: &str) -> ExpectResult<()>;
}

/// Collects pending rewrites in memory. Clones share the same list.
#[derive(Clone, Default)]
pub struct PendingInlineSnapshots {
    pending: Shared<Vec<(CallSite, String)>>,
}

impl PendingInlineSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<(CallSite, String)> {
        self.pending.borrow().clone()
    }
}

impl InlineSnapshotWriter for PendingInlineSnapshots {
    fn write(&mut self, site: &CallSite, snapshot: &str) -> ExpectResult<()> {
        let mut pending = self.pending.borrow_mut();
        pending.retain(|(existing, _)| existing != site);
        pending.push((site.clone(), snapshot.to_string()));
        Ok(())
    }
}

/// Normalize an inline literal: drop the first and last lines when blank and
/// remove the indentation shared by the remaining lines.
pub fn dedent(literal: &str) -> String {
    let mut lines: Vec<&str> = literal.lines().collect();
    if lines.first().map_or(false, |line| line.trim().is_empty()) {
        lines.remove(0);
    }
    if lines.last().map_or(false, |line| line.trim().is_empty()) {
        lines.pop();
    }
    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|line| line.get(indent..).unwrap_or_else(|| line.trim_start()))
        .collect::<Vec<_>>()
        .join("\n")
}
