// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RollError {
    /// The payload alone exceeds the size ceiling and can never be written.
    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: u64 },

    #[error("{op} '{}': {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("rolling file is closed")]
    Closed,

    /// Compression is configured off. Internal outcome, never returned by `write`.
    #[error("compression is disabled")]
    CompressionUnsupported,
}

pub type RollResult<T> = Result<T, RollError>;

impl RollError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        RollError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Kind of the underlying I/O failure, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            RollError::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}

impl From<RollError> for io::Error {
    fn from(err: RollError) -> Self {
        match err {
            RollError::Io { source, .. } => source,
            RollError::PayloadTooLarge { .. } => io::Error::new(io::ErrorKind::InvalidInput, err),
            RollError::Closed => io::Error::new(io::ErrorKind::BrokenPipe, err),
            RollError::CompressionUnsupported => io::Error::new(io::ErrorKind::Unsupported, err),
        }
    }
}
