// SPDX-FileCopyrightText: 2026 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::error::RollError;

/// Single-slot error relay from the background threads to `write`.
///
/// Posting never blocks: a newer error replaces a pending one.
#[derive(Clone, Default)]
pub(crate) struct ErrorMailbox {
    slot: Arc<Mutex<Option<RollError>>>,
}

impl ErrorMailbox {
    pub(crate) fn post(&self, err: RollError) {
        warn!("rollfile background error: {}", err);
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(stale) = slot.replace(err) {
            debug!("rollfile dropped unreported error: {}", stale);
        }
    }

    pub(crate) fn take(&self) -> Option<RollError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}
