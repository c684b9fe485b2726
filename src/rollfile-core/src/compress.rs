// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Background archive compression.
//!
//! Archives are compressed in place: `<name>` becomes `<name>.gz` and the
//! original is removed once the compressed copy is complete.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::GzBuilder;
use tracing::debug;

use crate::config::Compression;
use crate::error::{RollError, RollResult};
use crate::mailbox::ErrorMailbox;
use crate::retention::PruneSignal;

/// Compress `path` according to `kind`, returning the compressed path.
///
/// Returns [`RollError::CompressionUnsupported`] when compression is off.
pub(crate) fn compress_archive(kind: Compression, path: &Path) -> RollResult<PathBuf> {
    match kind {
        Compression::Gzip => gzip_file(path),
        Compression::None => Err(RollError::CompressionUnsupported),
    }
}

fn gzip_file(path: &Path) -> RollResult<PathBuf> {
    let mut gz_name = path.as_os_str().to_os_string();
    gz_name.push(crate::naming::GZ_SUFFIX);
    let gz_path = PathBuf::from(gz_name);

    let input = File::open(path).map_err(|e| RollError::io("open archive", path, e))?;
    let output = File::create(&gz_path).map_err(|e| RollError::io("create", &gz_path, e))?;

    if let Err(e) = write_gzip(path, input, output) {
        let _ = fs::remove_file(&gz_path);
        return Err(RollError::io("compress", path, e));
    }

    fs::remove_file(path).map_err(|e| RollError::io("remove archive", path, e))?;
    Ok(gz_path)
}

fn write_gzip(path: &Path, input: File, output: File) -> io::Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mtime = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);

    let mut encoder = GzBuilder::new()
        .filename(name)
        .mtime(mtime)
        .write(BufWriter::new(output), flate2::Compression::default());
    io::copy(&mut BufReader::new(input), &mut encoder)?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Spawn the compression thread.
///
/// The thread drains `rx` until every sender is dropped, so closing the
/// queue lets the backlog finish instead of cancelling it.
pub(crate) fn spawn_compressor(
    kind: Compression,
    rx: Receiver<PathBuf>,
    prune: PruneSignal,
    mailbox: ErrorMailbox,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("rollfile-compress".to_string())
        .spawn(move || {
            for archive in rx {
                match compress_archive(kind, &archive) {
                    Ok(gz_path) => {
                        debug!("Compressed {:?} -> {:?}", archive, gz_path);
                        prune.notify();
                    }
                    Err(RollError::CompressionUnsupported) => {
                        debug!("Compression disabled, keeping {:?}", archive);
                        prune.notify();
                    }
                    Err(e) if e.io_kind() == Some(io::ErrorKind::NotFound) => {
                        debug!("{:?} pruned before compression finished", archive);
                        prune.notify();
                    }
                    Err(e) => mailbox.post(e),
                }
            }
            debug!("Compression thread exiting");
        })
}
