use crate::features::PhishFeatures;
use crate::fetch::FetcherKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capture outcome counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureStats {
    pub fetched_ok: usize,
    pub fetch_failed: usize,
    /// Successful captures dropped because the page was a blank document
    pub empty_documents: usize,
}

/// Features of one stored page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFeatures {
    pub url: String,
    pub visible_text: String,
    pub features: PhishFeatures,
}

/// Summary of a harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestReport {
    pub run_id: Uuid,
    pub date: NaiveDate,
    pub fetcher: FetcherKind,
    pub feed_entries: usize,
    pub selected: usize,
    #[serde(flatten)]
    pub captures: CaptureStats,
    pub records: usize,
    pub uploaded: usize,
    pub destination: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<PageFeatures>,
}

impl HarvestReport {
    /// Share of selected pages that ended up stored
    pub fn yield_ratio(&self) -> f64 {
        if self.selected == 0 {
            0.0
        } else {
            self.records as f64 / self.selected as f64
        }
    }
}
