// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::io::{self, BufRead, Write};

use tracing::{error, warn};

use rollfile_core::{RollError, RollingFile};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
    pub lines: u64,
    pub bytes: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Copy `input` line by line into `file`, optionally echoing to `tee`.
///
/// Oversized lines are skipped, other write failures are reported and the
/// copy continues. Only a read error on `input` stops the pump.
pub fn pump<R: BufRead>(
    mut input: R,
    file: &RollingFile,
    mut tee: Option<&mut dyn Write>,
) -> io::Result<PumpStats> {
    let mut stats = PumpStats::default();
    let mut line = Vec::with_capacity(4096);

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        stats.lines += 1;

        if let Some(out) = tee.as_mut() {
            out.write_all(&line)?;
        }

        match file.write(&line) {
            Ok(n) => stats.bytes += n as u64,
            Err(RollError::PayloadTooLarge { len, max }) => {
                warn!("Skipping line {} ({} bytes > {} byte limit)", stats.lines, len, max);
                stats.skipped += 1;
            }
            Err(e) => {
                error!("Write failed at line {}: {}", stats.lines, e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}
