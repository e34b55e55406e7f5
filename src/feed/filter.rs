//! Selection of the feed entries a run captures

use super::types::FeedEntry;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Default day to harvest: the UTC day before `now`
///
/// PhishTank keeps verifying throughout the day, so the previous day is the
/// most recent one that is complete.
pub fn default_target_date(now: DateTime<Utc>) -> NaiveDate {
    (now - Duration::days(1)).date_naive()
}

/// Keeps entries verified on one day that are still online
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedFilter {
    pub date: NaiveDate,
    pub limit: usize,
}

impl FeedFilter {
    pub fn new(date: NaiveDate, limit: usize) -> Self {
        Self { date, limit }
    }

    /// Returns true if `entry` is verified, online and verified on `self.date`
    pub fn matches(&self, entry: &FeedEntry, date_str: &str) -> bool {
        entry.verification_date() == date_str && entry.is_verified() && entry.is_online()
    }

    /// Applies the filter, keeping feed order, then truncates to `limit`
    pub fn select(&self, entries: Vec<FeedEntry>) -> Vec<FeedEntry> {
        let date_str = self.date.format("%Y-%m-%d").to_string();

        entries
            .into_iter()
            .filter(|entry| self.matches(entry, &date_str))
            .take(self.limit)
            .collect()
    }
}
