//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use crate::fetch::FetchStatus;
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { run_id, date } => {
                info!(run_id = %run_id, date = %date, "Starting harvest");
            }
            ProgressEvent::FeedFetched {
                entries,
                fetch_time,
            } => {
                info!(
                    entries,
                    fetch_time_ms = fetch_time.as_millis(),
                    "Feed fetched"
                );
            }
            ProgressEvent::Selected { selected } => {
                info!(selected, "Selected feed entries for capture");
            }
            ProgressEvent::PageCaptured {
                url,
                index,
                total,
                status,
                elapsed,
            } => match status {
                FetchStatus::Success => debug!(
                    url = %url,
                    progress = format!("{}/{}", index, total),
                    elapsed_ms = elapsed.as_millis(),
                    "Page captured"
                ),
                FetchStatus::Failed => warn!(
                    url = %url,
                    progress = format!("{}/{}", index, total),
                    elapsed_ms = elapsed.as_millis(),
                    "Page capture failed"
                ),
            },
            ProgressEvent::UploadComplete { rows, destination } => {
                info!(rows, destination = %destination, "Records stored");
            }
            ProgressEvent::Completed {
                records,
                total_time,
            } => {
                info!(
                    records,
                    total_time_ms = total_time.as_millis(),
                    "Harvest complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Harvest failed");
            }
        }
    }
}
