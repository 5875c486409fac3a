//! Host history integration: push/replace records keyed by screen.

use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::domain::ScreenId;

pub trait HistoryBackend: Send + Sync {
    fn push(&self, screen: ScreenId);
    fn replace(&self, screen: ScreenId);

    /// Drops every record and leaves a single entry for `screen`.
    fn reset_to(&self, screen: ScreenId) {
        self.replace(screen);
    }
}

#[derive(Debug)]
struct HistoryRecords {
    entries: Vec<ScreenId>,
    cursor: usize,
}

/// Browser-like history stack with a cursor for back/forward.
///
/// `back` and `forward` move the cursor and return the fragment a browser
/// would report, which callers feed to `DonationFlow::restore_from_external_nav`.
#[derive(Debug)]
pub struct InMemoryHistory {
    records: Mutex<HistoryRecords>,
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HistoryRecords {
                entries: vec![ScreenId::Search],
                cursor: 0,
            }),
        }
    }

    fn records(&self) -> MutexGuard<'_, HistoryRecords> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn back(&self) -> Option<String> {
        let mut records = self.records();
        if records.cursor == 0 {
            return None;
        }
        records.cursor -= 1;
        Some(records.entries[records.cursor].fragment())
    }

    pub fn forward(&self) -> Option<String> {
        let mut records = self.records();
        if records.cursor + 1 >= records.entries.len() {
            return None;
        }
        records.cursor += 1;
        Some(records.entries[records.cursor].fragment())
    }

    pub fn current(&self) -> ScreenId {
        let records = self.records();
        records.entries[records.cursor]
    }

    pub fn current_fragment(&self) -> String {
        self.current().fragment()
    }

    pub fn entries(&self) -> Vec<ScreenId> {
        self.records().entries.clone()
    }
}

impl HistoryBackend for InMemoryHistory {
    fn push(&self, screen: ScreenId) {
        let mut records = self.records();
        let keep = records.cursor + 1;
        records.entries.truncate(keep);
        records.entries.push(screen);
        records.cursor = records.entries.len() - 1;
    }

    fn replace(&self, screen: ScreenId) {
        let mut records = self.records();
        let cursor = records.cursor;
        records.entries[cursor] = screen;
    }

    fn reset_to(&self, screen: ScreenId) {
        let mut records = self.records();
        records.entries = vec![screen];
        records.cursor = 0;
    }
}

#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
