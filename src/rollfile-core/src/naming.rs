// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Archive naming and ordering.
//!
//! Archives are named `<prefix><YYYYMMDDHHMMSS>[seq].log`, where `seq` is
//! appended only when an archive for the same second already exists. Once
//! compressed, the compression suffix is appended to the full name
//! (`<prefix>20260102030405.log.gz`). Creation order is recovered from the
//! name alone, so the retention sweep needs no state besides the directory.

use std::cmp::Ordering;

use chrono::{DateTime, TimeZone};

pub const LOG_SUFFIX: &str = ".log";
pub const GZ_SUFFIX: &str = ".gz";

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const STAMP_LEN: usize = 14;

/// Second-resolution timestamp embedded in archive names.
pub fn stamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format(STAMP_FORMAT).to_string()
}

/// Archive file name for `stamp` with disambiguator `seq` (0 = none).
pub fn archive_name(prefix: &str, stamp: &str, seq: u64) -> String {
    if seq == 0 {
        format!("{}{}{}", prefix, stamp, LOG_SUFFIX)
    } else {
        format!("{}{}{}{}", prefix, stamp, seq, LOG_SUFFIX)
    }
}

/// Hands out archive names for one writer.
///
/// Remembers the last name it issued so that a name freed by the retention
/// sweep within the same second is never handed out again out of order.
#[derive(Debug)]
pub struct ArchiveNamer {
    prefix: String,
    last: Option<(String, u64)>,
}

impl ArchiveNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last: None,
        }
    }

    /// First free name for `stamp`; `taken` reports whether a name is in use.
    pub fn next(&mut self, stamp: &str, taken: impl Fn(&str) -> bool) -> String {
        let mut seq = match &self.last {
            Some((last_stamp, last_seq)) if last_stamp.as_str() == stamp => last_seq + 1,
            _ => 0,
        };
        loop {
            let name = archive_name(&self.prefix, stamp, seq);
            if !taken(&name) {
                self.last = Some((stamp.to_string(), seq));
                return name;
            }
            seq += 1;
        }
    }
}

/// Strip `prefix` and the archive suffixes, leaving the ordering stem.
///
/// A compressed archive yields the same stem as its uncompressed original.
pub fn stem<'a>(prefix: &str, name: &'a str) -> &'a str {
    let name = name.strip_suffix(GZ_SUFFIX).unwrap_or(name);
    let name = name.strip_suffix(LOG_SUFFIX).unwrap_or(name);
    name.strip_prefix(prefix).unwrap_or(name)
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct StampKey {
    stamp: u64,
    seq: u64,
}

fn stamp_key(stem: &str) -> Option<StampKey> {
    if stem.len() < STAMP_LEN || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (stamp, seq) = stem.split_at(STAMP_LEN);
    Some(StampKey {
        stamp: stamp.parse().ok()?,
        seq: if seq.is_empty() { 0 } else { seq.parse().ok()? },
    })
}

/// Sort key of a stem. Timestamped stems order among themselves by
/// (timestamp, sequence) and always sort before any other stem.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum OrderKey<'a> {
    Stamp(StampKey),
    Text(&'a str),
}

fn order_key(stem: &str) -> OrderKey<'_> {
    match stamp_key(stem) {
        Some(key) => OrderKey::Stamp(key),
        None => OrderKey::Text(stem),
    }
}

/// Creation order of two stems.
///
/// Stems that carry a timestamp compare by (timestamp, sequence), so
/// `…595` (second 59, seq 5) sorts before the next second. Other stems
/// compare as plain strings and sort after every timestamped stem, which
/// keeps the order total for any mix of names.
pub fn compare_stems(a: &str, b: &str) -> Ordering {
    order_key(a).cmp(&order_key(b))
}

/// Whether `name` looks like an archive owned by `prefix`.
pub fn is_archive(prefix: &str, active_name: &str, name: &str) -> bool {
    name.starts_with(prefix)
        && name != active_name
        && (name.ends_with(LOG_SUFFIX) || name.ends_with(GZ_SUFFIX))
}
