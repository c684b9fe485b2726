// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! The rotating writer.
//!
//! All rotation decisions happen under one mutex together with the append,
//! so a payload always lands in whichever file is active right after the
//! rotation it caused. Compression and retention run on their own threads
//! and are fed through bounded queues that are only ever `try_send`-ed.

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use chrono::Local;
use tracing::{debug, error, warn};

use crate::compress::spawn_compressor;
use crate::config::RollConfig;
use crate::error::{RollError, RollResult};
use crate::mailbox::ErrorMailbox;
use crate::naming::{self, ArchiveNamer};
use crate::retention::{spawn_sweeper, PruneSignal, Sweeper};

struct WriterState {
    file: Option<File>,
    namer: ArchiveNamer,
    closed: bool,
    compress_tx: Option<SyncSender<PathBuf>>,
    prune: Option<PruneSignal>,
    compressor: Option<JoinHandle<()>>,
    sweeper: Option<JoinHandle<()>>,
}

/// Size-bounded, self-rotating, self-compressing log file.
///
/// `write` may be called concurrently from any number of threads; calls are
/// serialized internally. Errors from the background threads are reported
/// by the next `write`.
pub struct RollingFile {
    config: RollConfig,
    dir: PathBuf,
    prefix: String,
    active_name: String,
    active_path: PathBuf,
    max_size: u64,
    mailbox: ErrorMailbox,
    state: Mutex<WriterState>,
}

impl RollingFile {
    /// Create the target directory and start the background threads.
    ///
    /// The active file itself is opened lazily by the first write.
    pub fn new(config: RollConfig) -> RollResult<Self> {
        let prefix = config.effective_prefix().to_string();
        let max_size = config.effective_max_size();
        let (dir, active_name) = config.resolve_target();
        let active_path = dir.join(&active_name);
        let capacity = config.queue_capacity.max(1);

        create_dir_all(&dir).map_err(|e| RollError::io("create log dir", &dir, e))?;

        let mailbox = ErrorMailbox::default();
        let (compress_tx, compress_rx) = sync_channel::<PathBuf>(capacity);
        let (prune_tx, prune_rx) = sync_channel::<()>(capacity);
        let prune = PruneSignal::new(prune_tx);

        let sweeper = Sweeper::new(
            dir.clone(),
            prefix.clone(),
            active_name.clone(),
            config.max_archives,
        );
        let sweeper = spawn_sweeper(sweeper, prune_rx, mailbox.clone())
            .map_err(|e| RollError::io("spawn retention thread", &dir, e))?;
        let compressor = spawn_compressor(
            config.compression,
            compress_rx,
            prune.clone(),
            mailbox.clone(),
        )
        .map_err(|e| RollError::io("spawn compression thread", &dir, e))?;

        debug!(
            "Rolling file {:?} (max {} bytes, keep {}, compression {})",
            active_path, max_size, config.max_archives, config.compression
        );

        Ok(Self {
            dir,
            active_path,
            active_name,
            max_size,
            mailbox,
            state: Mutex::new(WriterState {
                file: None,
                namer: ArchiveNamer::new(prefix.clone()),
                closed: false,
                compress_tx: Some(compress_tx),
                prune: Some(prune),
                compressor: Some(compressor),
                sweeper: Some(sweeper),
            }),
            prefix,
            config,
        })
    }

    pub fn config(&self) -> &RollConfig {
        &self.config
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn active_name(&self) -> &str {
        &self.active_name
    }

    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Append `payload` to the active file, rotating first if it would not fit.
    ///
    /// A pending background error is returned instead of writing. A payload
    /// larger than the size ceiling is rejected without touching any file.
    pub fn write(&self, payload: &[u8]) -> RollResult<usize> {
        let mut state = self.lock_state();
        if state.closed {
            return Err(RollError::Closed);
        }
        if let Some(err) = self.mailbox.take() {
            return Err(err);
        }
        if payload.len() as u64 > self.max_size {
            return Err(RollError::PayloadTooLarge {
                len: payload.len(),
                max: self.max_size,
            });
        }

        let file = self.make_room(&mut state, payload.len() as u64)?;
        file.write_all(payload)
            .map_err(|e| RollError::io("write", &self.active_path, e))?;
        Ok(payload.len())
    }

    /// Flush the active file, if one is open.
    pub fn flush(&self) -> RollResult<()> {
        let mut state = self.lock_state();
        match state.file.as_mut() {
            Some(file) => file
                .flush()
                .map_err(|e| RollError::io("flush", &self.active_path, e)),
            None => Ok(()),
        }
    }

    /// Close the active file and wait for queued background work.
    ///
    /// In-flight compression and pruning are not cancelled: the call returns
    /// once the backlog present at close time is drained. Safe to call more
    /// than once and from several threads.
    pub fn close(&self) {
        let mut state = self.lock_state();
        if state.closed {
            return;
        }

        if let Some(mut file) = state.file.take() {
            if let Err(e) = file.flush() {
                warn!("flush {:?} on close failed: {}", self.active_path, e);
            }
        }
        state.closed = true;
        state.compress_tx = None;
        state.prune = None;

        // The compressor owns the last prune sender, so it must finish first
        // for the retention thread to see its queue close.
        for handle in [state.compressor.take(), state.sweeper.take()]
            .into_iter()
            .flatten()
        {
            if handle.join().is_err() {
                error!("rollfile background thread panicked");
            }
        }
        debug!("Rolling file {:?} closed", self.active_path);
    }

    pub fn is_closed(&self) -> bool {
        self.lock_state().closed
    }

    fn lock_state(&self) -> MutexGuard<'_, WriterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_active(&self) -> RollResult<File> {
        create_dir_all(&self.dir).map_err(|e| RollError::io("create log dir", &self.dir, e))?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.active_path)
            .map_err(|e| RollError::io("open", &self.active_path, e))
    }

    /// Ensure an active file is open with room for `incoming` bytes and
    /// return it.
    fn make_room<'s>(
        &self,
        state: &'s mut WriterState,
        incoming: u64,
    ) -> RollResult<&'s mut File> {
        let file = match state.file.take() {
            Some(file) => file,
            None => self.open_active()?,
        };
        let size = match file.metadata() {
            Ok(meta) => meta.len(),
            Err(e) => {
                state.file = Some(file);
                return Err(RollError::io("stat", &self.active_path, e));
            }
        };
        if size + incoming > self.max_size {
            state.file = Some(file);
            return self.rotate(state);
        }
        Ok(state.file.insert(file))
    }

    /// Rename the active file to a fresh archive name, queue it for
    /// compression, and open a new active file.
    ///
    /// On rename failure the old handle stays in place. If opening the new
    /// file fails the writer is left without a handle and the next write
    /// retries the open.
    fn rotate<'s>(&self, state: &'s mut WriterState) -> RollResult<&'s mut File> {
        let stamp = naming::stamp(&Local::now());
        let dir = &self.dir;
        let archive_name = state.namer.next(&stamp, |name| {
            dir.join(name).exists() || dir.join(format!("{}{}", name, naming::GZ_SUFFIX)).exists()
        });
        let archive_path = self.dir.join(&archive_name);

        if let Err(e) = std::fs::rename(&self.active_path, &archive_path) {
            if e.kind() == io::ErrorKind::NotFound {
                // Active file vanished underneath us; start over in a new one.
                warn!("{:?} disappeared, reopening", self.active_path);
                state.file = None;
                return Ok(state.file.insert(self.open_active()?));
            }
            return Err(RollError::io("rename", &self.active_path, e));
        }
        state.file = None;
        debug!("Rotated {:?} -> {:?}", self.active_path, archive_path);

        self.enqueue_archive(state, archive_path);

        Ok(state.file.insert(self.open_active()?))
    }

    fn enqueue_archive(&self, state: &WriterState, archive_path: PathBuf) {
        let Some(tx) = state.compress_tx.as_ref() else {
            return;
        };
        match tx.try_send(archive_path) {
            Ok(()) => {}
            Err(TrySendError::Full(path)) | Err(TrySendError::Disconnected(path)) => {
                debug!("Compression queue unavailable, leaving {:?} uncompressed", path);
                if let Some(prune) = state.prune.as_ref() {
                    prune.notify();
                }
            }
        }
    }
}

impl Drop for RollingFile {
    fn drop(&mut self) {
        self.close();
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RollingFile::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        RollingFile::flush(self).map_err(io::Error::from)
    }
}

impl Write for &RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        RollingFile::write(*self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        RollingFile::flush(*self).map_err(io::Error::from)
    }
}
