//! Daily harvest orchestration
//!
//! # Flow
//!
//! 1. Download the feed and select the target day's verified, online entries
//! 2. Capture every selected page with bounded concurrency
//! 3. Drop failed captures and blank documents
//! 4. Build table rows (and optionally features) for the rest
//! 5. Store the rows through the configured sink
//!
//! # Example
//!
//! ```no_run
//! use phishharvest::harvest::{HarvestOptions, Harvester};
//! use phishharvest::store::JsonLinesSink;
//! use phishharvest::HarvestConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HarvestConfig::default();
//! let harvester = Harvester::from_config(&config, Arc::new(JsonLinesSink::stdout()))?;
//!
//! let report = harvester.run(&HarvestOptions::from_config(&config)).await?;
//! println!("{} records stored", report.uploaded);
//! # Ok(())
//! # }
//! ```

mod harvester;
mod report;

pub use harvester::{
    build_fetcher, build_records, supabase_sink, HarvestError, HarvestOptions, Harvester,
};
pub use report::{CaptureStats, HarvestReport, PageFeatures};
