use super::report::{CaptureStats, HarvestReport, PageFeatures};
use crate::config::{ConfigError, HarvestConfig};
use crate::features::{extract_features, ExtractOptions};
use crate::feed::{default_target_date, FeedClient, FeedEntry, FeedError, FeedFilter};
use crate::fetch::batch::{fetch_all_with, Capture};
use crate::fetch::browser::BrowserFetchConfig;
use crate::fetch::{is_empty_document, BrowserFetcher, FetcherKind, HttpFetcher, PageFetcher};
use crate::progress::{LoggingHandler, ProgressEvent, ProgressHandler};
use crate::store::{PhishRecord, RecordSink, StoreError, SupabaseSink};
use chrono::{NaiveDate, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Errors that abort a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Capture backend could not be set up
    #[error("Failed to initialize {kind} fetcher: {message}")]
    FetcherInit { kind: FetcherKind, message: String },
}

/// Per-run parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOptions {
    /// Verification day to harvest
    pub date: NaiveDate,
    /// Maximum pages captured
    pub limit: usize,
    pub concurrency: usize,
    /// Compute page features into the report
    pub extract: Option<ExtractOptions>,
}

impl HarvestOptions {
    /// Yesterday's entries with the configured limits
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            date: default_target_date(Utc::now()),
            limit: config.max_pages,
            concurrency: config.concurrency,
            extract: None,
        }
    }
}

/// Creates the configured capture backend
pub fn build_fetcher(
    config: &HarvestConfig,
    kind: FetcherKind,
) -> Result<Arc<dyn PageFetcher>, HarvestError> {
    match kind {
        FetcherKind::Browser => Ok(Arc::new(BrowserFetcher::new(BrowserFetchConfig {
            webdriver_url: config.webdriver_url.clone(),
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            settle: Duration::from_millis(config.settle_ms),
            ..Default::default()
        }))),
        FetcherKind::Http => HttpFetcher::new(config.max_page_bytes())
            .map(|f| Arc::new(f) as Arc<dyn PageFetcher>)
            .map_err(|e| HarvestError::FetcherInit {
                kind,
                message: e.to_string(),
            }),
    }
}

/// Creates the Supabase sink from configured credentials
pub fn supabase_sink(config: &HarvestConfig) -> Result<SupabaseSink, HarvestError> {
    let (project_url, key) = config.supabase_credentials()?;
    let sink = SupabaseSink::new(
        &project_url,
        key,
        &config.table,
        config.upload_batch_size,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    Ok(sink)
}

/// Pairs captures with their feed entries and keeps the usable ones
///
/// `entries` and `captures` must be in the same order. Failed captures and
/// blank documents are dropped.
pub fn build_records(
    entries: &[FeedEntry],
    captures: Vec<Capture>,
    fetched_date: &str,
) -> (Vec<PhishRecord>, CaptureStats) {
    let mut stats = CaptureStats::default();
    let mut records = Vec::new();

    for (entry, capture) in entries.iter().zip(captures) {
        let html = match capture.html {
            Some(html) if !html.is_empty() => html,
            _ => {
                stats.fetch_failed += 1;
                continue;
            }
        };
        stats.fetched_ok += 1;

        if is_empty_document(&html) {
            stats.empty_documents += 1;
            continue;
        }

        records.push(PhishRecord {
            url: entry.url.clone(),
            html_content: html,
            target: entry.target.clone(),
            verification_time: entry.verification_time.clone(),
            fetched_date: fetched_date.to_string(),
        });
    }

    (records, stats)
}

/// Runs the feed → capture → store flow
pub struct Harvester {
    feed: FeedClient,
    fetcher: Arc<dyn PageFetcher>,
    fetcher_kind: FetcherKind,
    sink: Arc<dyn RecordSink>,
    progress: Arc<dyn ProgressHandler>,
}

impl Harvester {
    pub fn new(
        feed: FeedClient,
        fetcher: Arc<dyn PageFetcher>,
        fetcher_kind: FetcherKind,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        Self {
            feed,
            fetcher,
            fetcher_kind,
            sink,
            progress: Arc::new(LoggingHandler),
        }
    }

    /// Builds feed client and fetcher from configuration
    pub fn from_config(
        config: &HarvestConfig,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self, HarvestError> {
        let feed = FeedClient::new(
            config.feed_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        let fetcher = build_fetcher(config, config.fetcher)?;

        Ok(Self::new(feed, fetcher, config.fetcher, sink))
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = progress;
        self
    }

    /// Downloads the feed and applies the day filter
    ///
    /// Returns the total feed size alongside the selected entries.
    pub async fn select(
        &self,
        date: NaiveDate,
        limit: usize,
    ) -> Result<(usize, Vec<FeedEntry>), HarvestError> {
        let start = Instant::now();
        let entries = self.feed.fetch().await?;
        let total = entries.len();

        self.progress.on_progress(&ProgressEvent::FeedFetched {
            entries: total,
            fetch_time: start.elapsed(),
        });

        let selected = FeedFilter::new(date, limit).select(entries);
        self.progress.on_progress(&ProgressEvent::Selected {
            selected: selected.len(),
        });

        Ok((total, selected))
    }

    /// Executes one full run
    pub async fn run(&self, options: &HarvestOptions) -> Result<HarvestReport, HarvestError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("harvest", run_id = %run_id, date = %options.date);

        let result = self.run_inner(run_id, options).instrument(span).await;
        if let Err(ref e) = result {
            self.progress.on_progress(&ProgressEvent::Failed {
                error: e.to_string(),
            });
        }
        result
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        options: &HarvestOptions,
    ) -> Result<HarvestReport, HarvestError> {
        let start = Instant::now();
        self.progress.on_progress(&ProgressEvent::Started {
            run_id: run_id.to_string(),
            date: options.date.to_string(),
        });

        let (feed_entries, selected) = self.select(options.date, options.limit).await?;

        let urls: Vec<String> = selected.iter().map(|e| e.url.clone()).collect();
        let total = urls.len();
        let done = AtomicUsize::new(0);

        let captures = fetch_all_with(
            self.fetcher.as_ref(),
            &urls,
            options.concurrency,
            |capture| {
                let index = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.progress.on_progress(&ProgressEvent::PageCaptured {
                    url: capture.url.clone(),
                    index,
                    total,
                    status: capture.status(),
                    elapsed: capture.elapsed,
                });
            },
        )
        .await;

        let fetched_date = Utc::now().format("%Y-%m-%d").to_string();
        let (records, stats) = build_records(&selected, captures, &fetched_date);

        info!(
            fetched_ok = stats.fetched_ok,
            fetch_failed = stats.fetch_failed,
            empty_documents = stats.empty_documents,
            records = records.len(),
            "Captures processed"
        );

        let features = match options.extract {
            Some(ref extract) => records
                .iter()
                .map(|record| {
                    let (visible_text, features) =
                        extract_features(&record.url, Some(&record.html_content), extract);
                    PageFeatures {
                        url: record.url.clone(),
                        visible_text,
                        features,
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        let destination = self.sink.describe();
        let uploaded = if records.is_empty() {
            info!("No records to upload");
            0
        } else {
            match self.sink.insert(&records).await {
                Ok(rows) => rows,
                Err(e) => {
                    if e.rows_inserted() > 0 {
                        warn!(
                            rows = e.rows_inserted(),
                            destination = %destination,
                            "Upload failed after partial insert"
                        );
                    }
                    return Err(e.into());
                }
            }
        };

        self.progress.on_progress(&ProgressEvent::UploadComplete {
            rows: uploaded,
            destination: destination.clone(),
        });
        self.progress.on_progress(&ProgressEvent::Completed {
            records: records.len(),
            total_time: start.elapsed(),
        });

        Ok(HarvestReport {
            run_id,
            date: options.date,
            fetcher: self.fetcher_kind,
            feed_entries,
            selected: total,
            captures: stats,
            records: records.len(),
            uploaded,
            destination,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            features,
        })
    }
}
