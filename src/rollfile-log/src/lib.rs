// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Leveled text logger that fans each formatted line out to any number of
//! byte sinks such as a rotating file, stdout or a socket.

pub mod logger;
pub mod sink;

pub use logger::{Level, Logger};
pub use sink::{connect_sink, SinkError};
