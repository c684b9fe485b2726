// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Background retention sweep.
//!
//! Every sweep recomputes the archive set from the directory listing; the
//! sweeper keeps no state between runs, so a dropped signal or a crash only
//! delays enforcement until the next sweep.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::error::{RollError, RollResult};
use crate::mailbox::ErrorMailbox;
use crate::naming;

/// Non-blocking "a sweep may be worthwhile" trigger.
#[derive(Clone)]
pub(crate) struct PruneSignal {
    tx: SyncSender<()>,
}

impl PruneSignal {
    pub(crate) fn new(tx: SyncSender<()>) -> Self {
        Self { tx }
    }

    /// A full queue already holds a pending sweep, so the signal is dropped.
    pub(crate) fn notify(&self) {
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {
                debug!("Retention thread gone, prune signal dropped");
            }
        }
    }
}

/// One archive as seen in the directory, possibly spread over an
/// uncompressed and a compressed file while compression is in flight.
#[derive(Debug)]
struct Archive {
    stem: String,
    files: Vec<PathBuf>,
}

pub(crate) struct Sweeper {
    dir: PathBuf,
    prefix: String,
    active_name: String,
    keep: usize,
}

impl Sweeper {
    pub(crate) fn new(dir: PathBuf, prefix: String, active_name: String, keep: usize) -> Self {
        Self {
            dir,
            prefix,
            active_name,
            keep,
        }
    }

    /// Archives owned by this writer, oldest first.
    fn archives(&self) -> RollResult<Vec<Archive>> {
        let entries =
            fs::read_dir(&self.dir).map_err(|e| RollError::io("list", &self.dir, e))?;

        let mut archives: Vec<Archive> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RollError::io("list", &self.dir, e))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !naming::is_archive(&self.prefix, &self.active_name, name) {
                continue;
            }
            let stem = naming::stem(&self.prefix, name);
            match archives.iter_mut().find(|a| a.stem == stem) {
                Some(archive) => archive.files.push(entry.path()),
                None => archives.push(Archive {
                    stem: stem.to_string(),
                    files: vec![entry.path()],
                }),
            }
        }

        archives.sort_by(|a, b| naming::compare_stems(&a.stem, &b.stem));
        Ok(archives)
    }

    /// Delete archives beyond the retention count, oldest first.
    ///
    /// Returns the number of files removed. Individual delete failures are
    /// posted to `mailbox` and do not stop the sweep.
    pub(crate) fn sweep(&self, mailbox: &ErrorMailbox) -> usize {
        let archives = match self.archives() {
            Ok(archives) => archives,
            Err(e) => {
                mailbox.post(e);
                return 0;
            }
        };
        if archives.len() <= self.keep {
            return 0;
        }

        let excess = archives.len() - self.keep;
        let mut removed = 0;
        for archive in &archives[..excess] {
            for path in &archive.files {
                match fs::remove_file(path) {
                    Ok(()) => {
                        info!("Removed old archive {:?}", path);
                        removed += 1;
                    }
                    // Compression finished between listing and removal.
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => mailbox.post(RollError::io("remove", path, e)),
                }
            }
        }
        removed
    }
}

/// Spawn the retention thread.
///
/// Pending signals are coalesced into a single sweep. The thread exits
/// once every [`PruneSignal`] is dropped and the queue is drained.
pub(crate) fn spawn_sweeper(
    sweeper: Sweeper,
    rx: Receiver<()>,
    mailbox: ErrorMailbox,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("rollfile-retention".to_string())
        .spawn(move || {
            while rx.recv().is_ok() {
                while rx.try_recv().is_ok() {}
                let removed = sweeper.sweep(&mailbox);
                debug!("Retention sweep removed {} file(s)", removed);
            }
            debug!("Retention thread exiting");
        })
}
