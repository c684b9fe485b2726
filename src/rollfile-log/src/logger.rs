// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Leveled, multi-sink text logger.
//!
//! Each record is rendered as
//! `[proc] [YYYY-MM-DD HH:MM:SS.uuuuuu] [level] [file:line] <sid:ID> message`
//! where the call site is only included for warn/error and the session tag
//! only when a session id is set.

use std::fmt::{self, Write as _};
use std::io::Write;
use std::panic::Location;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Local;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown names map to `Debug` so a typo never silences output.
impl FromStr for Level {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "info" => Level::Info,
            "warn" | "warning" => Level::Warn,
            "error" => Level::Error,
            _ => Level::Debug,
        })
    }
}

type Callback = Arc<dyn Fn(&str) + Send + Sync>;

struct Shared {
    proc_name: String,
    level: Level,
    // Line buffer and sinks share one lock so lines never interleave.
    out: Mutex<Output>,
}

struct Output {
    line: String,
    sinks: Vec<Box<dyn Write + Send>>,
}

/// Cheaply clonable logger handle.
///
/// Handles derived with [`Logger::with_session`] or [`Logger::with_callback`]
/// share the sinks of the logger they were derived from.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    session: Option<String>,
    callback: Option<Callback>,
}

impl Logger {
    pub fn new(level: Level, proc_name: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                proc_name: proc_name.into(),
                level,
                out: Mutex::new(Output {
                    line: String::with_capacity(512),
                    sinks: Vec::new(),
                }),
            }),
            session: None,
            callback: None,
        }
    }

    pub fn level(&self) -> Level {
        self.shared.level
    }

    /// Register another destination. Every later record is written to it.
    pub fn add_sink(&self, sink: impl Write + Send + 'static) {
        self.add_boxed_sink(Box::new(sink));
    }

    pub fn add_boxed_sink(&self, sink: Box<dyn Write + Send>) {
        self.lock_output().sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.lock_output().sinks.len()
    }

    /// Handle that tags every record with `<sid:id>`.
    pub fn with_session(&self, id: impl Into<String>) -> Self {
        Self {
            session: Some(id.into()),
            ..self.clone()
        }
    }

    /// Handle that also passes every rendered line to `callback`.
    pub fn with_callback(&self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            callback: Some(Arc::new(callback)),
            ..self.clone()
        }
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.shared.level
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Debug, None, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Info, None, args);
    }

    #[track_caller]
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Warn, Some(Location::caller()), args);
    }

    #[track_caller]
    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.emit(Level::Error, Some(Location::caller()), args);
    }

    /// Flush every sink.
    pub fn flush(&self) {
        for sink in self.lock_output().sinks.iter_mut() {
            if let Err(e) = sink.flush() {
                warn!("log sink flush failed: {}", e);
            }
        }
    }

    fn lock_output(&self) -> std::sync::MutexGuard<'_, Output> {
        self.shared
            .out
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, level: Level, caller: Option<&Location<'_>>, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }

        let mut out = self.lock_output();
        let Output { line, sinks } = &mut *out;
        line.clear();
        self.format_header(line, level, caller);
        let _ = line.write_fmt(args);

        for sink in sinks.iter_mut() {
            if let Err(e) = sink.write_all(line.as_bytes()) {
                warn!("log sink write failed: {}", e);
            }
        }
        if let Some(callback) = &self.callback {
            callback(line.as_str());
        }
    }

    fn format_header(&self, line: &mut String, level: Level, caller: Option<&Location<'_>>) {
        let now = Local::now();
        let _ = write!(
            line,
            "[{}] [{}] [{:<5}] ",
            self.shared.proc_name,
            now.format("%Y-%m-%d %H:%M:%S%.6f"),
            level.as_str()
        );
        if let Some(caller) = caller {
            let file = Path::new(caller.file())
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("???");
            let _ = write!(line, "[{}:{}] ", file, caller.line());
        }
        if let Some(session) = self.session.as_deref().filter(|s| !s.is_empty()) {
            let _ = write!(line, "<sid:{}> ", session);
        }
    }
}
