// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Size-bounded rotating log file.
//!
//! [`RollingFile`] appends byte payloads to a single active file. Once the
//! next payload would push the file past the configured ceiling, the active
//! file is renamed to a timestamped archive and a fresh one is opened. A
//! background thread gzips each archive and another one prunes archives
//! beyond the retention count. Neither thread ever blocks the write path.

pub mod config;
pub mod error;
pub mod naming;
pub mod writer;

mod compress;
mod mailbox;
mod retention;

pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;
pub const GB: u64 = 1024 * MB;

/// Size ceiling used when the configured one is zero.
pub const DEFAULT_MAX_SIZE: u64 = 100 * MB;
/// Prefix used when the configured one is empty.
pub const DEFAULT_PREFIX: &str = "default";

pub use config::{Compression, RollConfig};
pub use error::{RollError, RollResult};
pub use writer::RollingFile;
