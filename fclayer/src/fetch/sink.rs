//! Render sinks.
//!
//! The controller never draws. It hands each completed generation's records
//! to a [`RenderSink`], which replaces everything previously shown.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use super::batch::ClassifiedLineRecord;

/// Loading indicator state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Error(String),
}

impl FetchStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, FetchStatus::Error(_))
    }
}

/// Receives rendered generations.
pub trait RenderSink: Send + Sync {
    /// Replaces everything shown with `records`.
    fn replace(&self, records: Vec<ClassifiedLineRecord>);

    /// Removes everything shown.
    fn clear(&self);

    fn set_status(&self, status: FetchStatus);
}

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<ClassifiedLineRecord>,
    renders: usize,
    clears: usize,
    statuses: Vec<FetchStatus>,
}

/// Sink holding the current records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records currently shown.
    pub fn records(&self) -> Vec<ClassifiedLineRecord> {
        self.lock().records.clone()
    }

    /// Number of `replace` calls.
    pub fn render_count(&self) -> usize {
        self.lock().renders
    }

    pub fn clear_count(&self) -> usize {
        self.lock().clears
    }

    /// Latest status; idle before any was set.
    pub fn status(&self) -> FetchStatus {
        self.lock().statuses.last().cloned().unwrap_or_default()
    }

    /// Every status set, oldest first.
    pub fn status_history(&self) -> Vec<FetchStatus> {
        self.lock().statuses.clone()
    }
}

impl RenderSink for MemorySink {
    fn replace(&self, records: Vec<ClassifiedLineRecord>) {
        let mut state = self.lock();
        state.records = records;
        state.renders += 1;
    }

    fn clear(&self) {
        let mut state = self.lock();
        state.records.clear();
        state.clears += 1;
    }

    fn set_status(&self, status: FetchStatus) {
        self.lock().statuses.push(status);
    }
}
