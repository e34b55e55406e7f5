//! Progress handler trait and events

use crate::fetch::FetchStatus;
use std::time::Duration;

/// Events emitted during a harvest run
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started { run_id: String, date: String },

    /// Feed downloaded
    FeedFetched { entries: usize, fetch_time: Duration },

    /// Entries for the target day selected
    Selected { selected: usize },

    /// One page capture finished
    PageCaptured {
        url: String,
        index: usize,
        total: usize,
        status: FetchStatus,
        elapsed: Duration,
    },

    /// Records handed to the sink
    UploadComplete { rows: usize, destination: String },

    /// Run finished
    Completed { records: usize, total_time: Duration },

    /// Run aborted
    Failed { error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
