//! Assertion configuration, loadable from TOML.
//!
//! ```toml
//! close_to_digits = 3
//! snapshot_update = "all"
//! string_match = "pattern"
//!
//! [format]
//! indent = 4
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ExpectError, ExpectResult};
use crate::format::FormatConfig;
use crate::snapshot::SnapshotUpdateMode;

/// How string arguments of `toMatch` / `toThrow` are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringMatchMode {
    /// Substring test.
    #[default]
    Literal,
    /// Regular expression test.
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectConfig {
    /// Default precision of `toBeCloseTo`.
    pub close_to_digits: u32,
    pub snapshot_update: SnapshotUpdateMode,
    pub string_match: StringMatchMode,
    /// Options for serialized snapshots.
    pub format: FormatConfig,
}

impl Default for ExpectConfig {
    fn default() -> Self {
        Self {
            close_to_digits: 2,
            snapshot_update: SnapshotUpdateMode::New,
            string_match: StringMatchMode::Literal,
            format: FormatConfig::snapshot(),
        }
    }
}

impl ExpectConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> ExpectResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ExpectError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ExpectError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_toml_str(content: &str) -> ExpectResult<Self> {
        toml::from_str(content).map_err(|e| ExpectError::Config {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn with_close_to_digits(mut self, digits: u32) -> Self {
        self.close_to_digits = digits;
        self
    }

    pub fn with_snapshot_update(mut self, mode: SnapshotUpdateMode) -> Self {
        self.snapshot_update = mode;
        self
    }

    pub fn with_string_match(mut self, mode: StringMatchMode) -> Self {
        self.string_match = mode;
        self
    }

    pub fn with_format(mut self, format: FormatConfig) -> Self {
        self.format = format;
        self
    }
}
