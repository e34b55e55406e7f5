//! Subcommand handlers
//!
//! Each handler returns the process exit code.

use super::commands::{ConfigArgs, ExtractArgs, FeedArgs, HarvestArgs};
use super::output::{OutputFormat, OutputFormatter};
use crate::config::HarvestConfig;
use crate::features::{extract_features, ExtractOptions};
use crate::feed::{FeedClient, FeedFilter};
use crate::harvest::{build_fetcher, supabase_sink, HarvestOptions, Harvester, PageFeatures};
use crate::store::{JsonLinesSink, RecordSink};
use crate::util::text::decode_utf8_dropping_invalid;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Validates `config` once all overrides have been applied
fn validated(config: HarvestConfig) -> Option<HarvestConfig> {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your PHISHHARVEST_* environment variables.");
        return None;
    }
    Some(config)
}

fn write_features(path: &Path, pages: &[PageFeatures]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for page in pages {
        serde_json::to_writer(&mut writer, page).context("Failed to serialize page features")?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Command-line flags take precedence over `PHISHHARVEST_*` values
fn apply_harvest_overrides(config: &mut HarvestConfig, args: &HarvestArgs) {
    if let Some(fetcher) = args.fetcher {
        config.fetcher = fetcher;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(limit) = args.limit {
        config.max_pages = limit;
    }
}

pub async fn handle_harvest(args: &HarvestArgs, quiet: bool) -> i32 {
    info!("Starting daily harvest");

    let mut config = HarvestConfig::default();
    apply_harvest_overrides(&mut config, args);
    let Some(config) = validated(config) else {
        return 1;
    };
    debug!("Effective configuration:\n{}", config);

    let sink: Arc<dyn RecordSink> = if args.dry_run {
        match JsonLinesSink::to_path_or_stdout(args.output.as_ref()) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                error!("Failed to open dry-run output: {}", e);
                return 1;
            }
        }
    } else {
        match supabase_sink(&config) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                error!("{}", e);
                eprintln!("\nSet SUPABASE_URL and SUPABASE_KEY, or use --dry-run.");
                return 1;
            }
        }
    };
    info!("Records will be written to {}", sink.describe());

    let harvester = match Harvester::from_config(&config, sink) {
        Ok(h) => h,
        Err(e) => {
            error!("Failed to initialize harvester: {}", e);
            return 1;
        }
    };

    let mut options = HarvestOptions::from_config(&config);
    if let Some(date) = args.date {
        options.date = date;
    }
    if args.features_out.is_some() {
        options.extract = Some(ExtractOptions::default());
    }

    let mut report = match harvester.run(&options).await {
        Ok(r) => r,
        Err(e) => {
            error!("Harvest failed: {}", e);
            return 1;
        }
    };

    if let Some(path) = &args.features_out {
        let pages = std::mem::take(&mut report.features);
        if let Err(e) = write_features(path, &pages) {
            error!("{:#}", e);
            return 1;
        }
        info!("Features for {} pages written to: {}", pages.len(), path.display());
    }

    if quiet {
        return 0;
    }

    let formatter = OutputFormatter::new(args.format.into());
    let output = match formatter.format_report(&report) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format output: {}", e);
            return 1;
        }
    };

    // Dry-run records own stdout when no output file is given
    if args.dry_run && args.output.is_none() {
        eprintln!("{}", output);
    } else {
        println!("{}", output);
    }

    0
}

pub async fn handle_feed(args: &FeedArgs) -> i32 {
    let Some(config) = validated(HarvestConfig::default()) else {
        return 1;
    };

    let feed = match FeedClient::new(
        config.feed_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    ) {
        Ok(f) => f,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let options = HarvestOptions::from_config(&config);
    let date = args.date.unwrap_or(options.date);
    let limit = args.limit.unwrap_or(options.limit);

    let entries = match feed.fetch().await {
        Ok(entries) => FeedFilter::new(date, limit).select(entries),
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };
    info!("{} entries selected for {}", entries.len(), date);

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_entries(&entries) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}

async fn load_page(args: &ExtractArgs) -> Result<Option<String>> {
    if let Some(path) = &args.html_file {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(Some(decode_utf8_dropping_invalid(&bytes)));
    }

    let config = HarvestConfig::default();
    config.validate().context("Invalid configuration")?;
    let kind = args.fetcher.unwrap_or(config.fetcher);
    let fetcher = build_fetcher(&config, kind)?;

    info!("Capturing {} with {} fetcher", args.url, fetcher.name());
    Ok(fetcher.fetch(&args.url).await)
}

pub async fn handle_extract(args: &ExtractArgs) -> i32 {
    let html = match load_page(args).await {
        Ok(Some(html)) => html,
        Ok(None) => {
            error!("Failed to capture {}", args.url);
            return 1;
        }
        Err(e) => {
            error!("{:#}", e);
            return 1;
        }
    };

    let options = ExtractOptions {
        max_tokens: args.max_tokens,
        ..ExtractOptions::default()
    };
    let (visible_text, features) = extract_features(&args.url, Some(&html), &options);
    let page = PageFeatures {
        url: args.url.clone(),
        visible_text,
        features,
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_page(&page) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let config = HarvestConfig::default();
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
    }

    let format: OutputFormat = args.format.into();
    match OutputFormatter::new(format).format_config(&config) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}
