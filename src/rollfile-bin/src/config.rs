// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file support for the `rollfile` binary.
//!
//! Config is loaded from the `[rollfile]` section of `rollfile.toml`; see
//! [`rollfile_app::config`] for the search order.

use serde::{Deserialize, Serialize};

use rollfile_app::ConfigFile;
use rollfile_core::RollConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Rotating writer settings
    pub writer: RollConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
    /// Also copy every input line to stdout
    pub tee: bool,
}

impl ConfigFile for AppConfig {
    fn section_key() -> &'static str {
        "rollfile"
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.writer.validate()
    }

    /// Render as a complete `rollfile.toml`.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let mut table = toml::Table::new();
        table.insert(
            Self::section_key().to_string(),
            toml::Value::try_from(self)?,
        );
        toml::to_string(&table)
    }
}
