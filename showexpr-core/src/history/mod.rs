//! Interactive-history lookup
//!
//! REPL and notebook front-ends evaluate each input as a fragment whose text
//! is not on disk anywhere. When such a front-end records its inputs, the
//! latest one is where the `show!` call's text survives.

mod file;
mod scan;

pub use file::FileHistory;
pub use scan::{scan_fragment, FragmentScan, FragmentValidity};

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ShowError;
use crate::extract::{extract, CallQuery};

/// One recorded input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session: u64,
    pub line: u64,
    pub input: String,
}

/// Session input history of an interactive front-end
pub trait HistoryProvider: Send + Sync {
    /// Current session, if one is active
    fn session(&self) -> Option<u64>;

    /// Entries recorded for `session`, oldest first
    fn range(&self, session: u64) -> Result<Vec<HistoryEntry>, ShowError>;
}

impl<H: HistoryProvider + ?Sized> HistoryProvider for Arc<H> {
    fn session(&self) -> Option<u64> {
        (**self).session()
    }

    fn range(&self, session: u64) -> Result<Vec<HistoryEntry>, ShowError> {
        (**self).range(session)
    }
}

/// Argument texts of the `target` call in the latest history input.
///
/// Empty when there is no session, no history, the latest input does not
/// call `target`, or it does not parse.
pub fn history_labels(provider: &dyn HistoryProvider, target: &str) -> Vec<String> {
    let input = match latest_input(provider) {
        Ok(Some(input)) => input,
        Ok(None) => {
            log::trace!("no history input available");
            return Vec::new();
        }
        Err(e) => {
            log::debug!("history lookup failed: {}", e);
            return Vec::new();
        }
    };

    let scan = scan_fragment(&input, target);
    if !scan.is_candidate() {
        log::trace!("latest input is not a `{}` call: {:?}", target, scan);
        return Vec::new();
    }

    extract(&input, &CallQuery::new(target))
}

fn latest_input(provider: &dyn HistoryProvider) -> Result<Option<String>, ShowError> {
    let Some(session) = provider.session() else {
        return Ok(None);
    };
    let entries = provider.range(session)?;
    Ok(entries
        .into_iter()
        .last()
        .map(|entry| entry.input)
        .filter(|input| !input.trim().is_empty()))
}

/// In-process history, for embedders that drive their own input loop
#[derive(Debug)]
pub struct MemoryHistory {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    session: u64,
    entries: Vec<HistoryEntry>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                session: 1,
                entries: Vec::new(),
            }),
        }
    }

    /// Record an input in the current session
    pub fn record(&self, input: impl Into<String>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let session = state.session;
        let line = state.entries.iter().filter(|e| e.session == session).count() as u64 + 1;
        state.entries.push(HistoryEntry {
            session,
            line,
            input: input.into(),
        });
    }

    /// Start a new session and return its id
    pub fn new_session(&self) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.session += 1;
        state.session
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryProvider for MemoryHistory {
    fn session(&self) -> Option<u64> {
        Some(self.state.lock().unwrap_or_else(PoisonError::into_inner).session)
    }

    fn range(&self, session: u64) -> Result<Vec<HistoryEntry>, ShowError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .entries
            .iter()
            .filter(|e| e.session == session)
            .cloned()
            .collect())
    }
}
