//! Recording view for testing.
//!
//! `RecordingView` implements [`SnapshotView`] and keeps every snapshot and
//! error it receives for later assertion.

use crate::error::{AssistError, Result};
use crate::steps::{Snapshot, StatusValue};

use super::SnapshotView;

/// Captures every snapshot of a run.
#[derive(Debug)]
pub struct RecordingView<D> {
    snapshots: Vec<Snapshot<D>>,
    errors: Vec<String>,
}

impl<D> Default for RecordingView<D> {
    fn default() -> Self {
        Self {
            snapshots: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl<D> RecordingView<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all captured snapshots.
    pub fn snapshots(&self) -> &[Snapshot<D>] {
        &self.snapshots
    }

    /// Get all captured error messages.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Progress markup of every progress snapshot, in order.
    pub fn progress_markups(&self) -> Vec<&str> {
        self.snapshots
            .iter()
            .filter_map(|s| s.status.progress())
            .collect()
    }

    /// Last status message, if any snapshot carried one.
    pub fn last_message(&self) -> Option<&StatusValue> {
        self.snapshots
            .iter()
            .rev()
            .map(|s| &s.status)
            .find(|status| matches!(status, StatusValue::Message { .. }))
    }

    /// Check if a specific error was shown.
    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|e| e.contains(msg))
    }
}

impl<D: Clone> SnapshotView<D> for RecordingView<D> {
    fn apply(&mut self, snapshot: &Snapshot<D>) -> Result<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }

    fn show_error(&mut self, error: &AssistError) {
        self.errors.push(error.to_string());
    }
}
