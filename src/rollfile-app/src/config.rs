// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! `rollfile.toml` discovery and section loading.
//!
//! Search order when no file is given explicitly:
//! 1. `$ROLLFILE_CONFIG`
//! 2. `./rollfile.toml`
//! 3. `~/.config/rollfile/rollfile.toml`
//! 4. `/etc/rollfile/rollfile.toml`

use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "rollfile.toml";
pub const CONFIG_ENV: &str = "ROLLFILE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("config file {} has no [{section}] section", path.display())]
    MissingSection { path: PathBuf, section: &'static str },
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.trim().is_empty() {
            paths.push(PathBuf::from(env_path.trim()));
        }
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("rollfile").join(CONFIG_FILE_NAME));
    }
    paths.push(Path::new("/etc/rollfile").join(CONFIG_FILE_NAME));
    paths
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Deserialize table `key` of the TOML file at `path`, `None` when absent.
fn read_section<T: DeserializeOwned>(path: &Path, key: &str) -> Result<Option<T>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut table: toml::Table = toml::from_str(&content).map_err(|e| parse_error(path, e))?;

    match table.remove(key) {
        // Going through the value keeps `#[serde(default)]` on T effective.
        Some(section) => section.try_into().map(Some).map_err(|e| parse_error(path, e)),
        None => Ok(None),
    }
}

/// A configuration struct stored as one section of `rollfile.toml`.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Table name of the section, e.g. `"rollfile"`.
    fn section_key() -> &'static str;

    /// Load from an explicit file; the section must be present.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        read_section(path, Self::section_key())?.ok_or_else(|| ConfigError::MissingSection {
            path: path.to_path_buf(),
            section: Self::section_key(),
        })
    }

    /// Load the first default-path file that carries the section.
    ///
    /// Returns `Default::default()` and `None` when nothing is found.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in search_paths() {
            if !path.is_file() {
                continue;
            }
            if let Some(cfg) = read_section(&path, Self::section_key())? {
                debug!("Loaded [{}] from {:?}", Self::section_key(), path);
                return Ok((cfg, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }

    /// Explicit file when given, otherwise the default search.
    fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match explicit {
            Some(path) => Ok((Self::load_from_file(path)?, Some(path.to_path_buf()))),
            None => Self::load_from_default_paths(),
        }
    }
}
