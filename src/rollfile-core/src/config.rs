// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Writer configuration.
//!
//! [`RollConfig`] can be built in code or deserialized from a TOML section;
//! every field has a default so partial sections are accepted.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_MAX_SIZE, DEFAULT_PREFIX};

/// Compression applied to rotated archives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Gzip,
    None,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Gzip => f.write_str("gzip"),
            Compression::None => f.write_str("none"),
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Ok(Compression::Gzip),
            "none" | "off" => Ok(Compression::None),
            other => Err(format!("unknown compression '{}'", other)),
        }
    }
}

/// Rotating file configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    /// Prefix of every file owned by the writer
    pub prefix: String,
    /// Directory (trailing separator) or directory plus active file name
    pub path: String,
    /// Archive compression
    pub compression: Compression,
    /// Size ceiling of the active file in bytes (0 = 100 MiB)
    pub max_size_bytes: u64,
    /// Number of rotated archives to keep
    pub max_archives: usize,
    /// Bound of the compression and prune queues
    pub queue_capacity: usize,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            path: "logs/".to_string(),
            compression: Compression::Gzip,
            max_size_bytes: DEFAULT_MAX_SIZE,
            max_archives: 10,
            queue_capacity: 1000,
        }
    }
}

impl RollConfig {
    pub fn new(prefix: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = bytes;
        self
    }

    pub fn with_max_archives(mut self, count: usize) -> Self {
        self.max_archives = count;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("[rollfile].path must not be empty".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("[rollfile].queue_capacity must be > 0".to_string());
        }
        Ok(())
    }

    /// Prefix with the default applied.
    pub fn effective_prefix(&self) -> &str {
        let prefix = self.prefix.trim();
        if prefix.is_empty() {
            DEFAULT_PREFIX
        } else {
            prefix
        }
    }

    /// Size ceiling with the default applied.
    pub fn effective_max_size(&self) -> u64 {
        if self.max_size_bytes == 0 {
            DEFAULT_MAX_SIZE
        } else {
            self.max_size_bytes
        }
    }

    /// Split `path` into the target directory and the active file name.
    ///
    /// A path ending in a separator, naming an existing directory, or whose
    /// last component is `.` designates a directory and the active file is
    /// `<prefix>.log`. Otherwise the last component is the active file name,
    /// with `.log` appended when missing.
    pub fn resolve_target(&self) -> (PathBuf, String) {
        let raw = self.path.trim();
        let default_name = format!("{}.log", self.effective_prefix());
        let path = Path::new(raw);

        if raw.ends_with('/') || raw.ends_with('\\') || path.is_dir() {
            return (path.to_path_buf(), default_name);
        }

        let Some(base) = path.file_name().and_then(|n| n.to_str()) else {
            return (path.to_path_buf(), default_name);
        };
        let base = base.trim();
        if base.is_empty() || base == "." {
            return (path.to_path_buf(), default_name);
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let name = if base.ends_with(".log") {
            base.to_string()
        } else {
            format!("{}.log", base)
        };
        (dir, name)
    }
}
