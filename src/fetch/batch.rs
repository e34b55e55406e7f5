//! Bounded concurrent capture of many URLs

use super::{FetchStatus, PageFetcher};
use futures_util::stream::{self, StreamExt};
use std::time::{Duration, Instant};

/// Result of capturing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub url: String,
    pub html: Option<String>,
    pub elapsed: Duration,
}

impl Capture {
    pub fn status(&self) -> FetchStatus {
        FetchStatus::of(self.html.as_deref())
    }
}

/// Captures every URL with at most `concurrency` in flight
///
/// Results come back in the same order as `urls`.
pub async fn fetch_all(
    fetcher: &dyn PageFetcher,
    urls: &[String],
    concurrency: usize,
) -> Vec<Capture> {
    fetch_all_with(fetcher, urls, concurrency, |_| {}).await
}

/// Like [`fetch_all`], calling `on_capture` in completion order
///
/// The returned captures are still in input order.
pub async fn fetch_all_with<F>(
    fetcher: &dyn PageFetcher,
    urls: &[String],
    concurrency: usize,
    on_capture: F,
) -> Vec<Capture>
where
    F: Fn(&Capture),
{
    let mut indexed: Vec<(usize, Capture)> = stream::iter(urls.iter().enumerate())
        .map(|(index, url)| async move {
            let start = Instant::now();
            let html = fetcher.fetch(url).await;
            let capture = Capture {
                url: url.clone(),
                html,
                elapsed: start.elapsed(),
            };
            (index, capture)
        })
        .buffer_unordered(concurrency.max(1))
        .inspect(|(_, capture)| on_capture(capture))
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, capture)| capture).collect()
}
