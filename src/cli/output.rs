//! Output formatting for multiple formats
//!
//! Harvest reports, feed listings, page features and configuration can be
//! rendered as JSON, YAML or human-readable text.
//!
//! # Example
//!
//! ```
//! use phishharvest::cli::output::{OutputFormat, OutputFormatter};
//! use phishharvest::HarvestConfig;
//!
//! let formatter = OutputFormatter::new(OutputFormat::Human);
//! let output = formatter.format_config(&HarvestConfig::default()).unwrap();
//! assert!(output.contains("Capture Configuration:"));
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::HarvestConfig;
use crate::feed::FeedEntry;
use crate::harvest::{HarvestReport, PageFeatures};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Output formatter for command results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a harvest run summary
    pub fn format_report(&self, report: &HarvestReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "harvest report"),
            OutputFormat::Yaml => to_yaml(report, "harvest report"),
            OutputFormat::Human => Ok(format_report_human(report)),
        }
    }

    /// Formats selected feed entries
    pub fn format_entries(&self, entries: &[FeedEntry]) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&entries, "feed entries"),
            OutputFormat::Yaml => to_yaml(&entries, "feed entries"),
            OutputFormat::Human => Ok(format_entries_human(entries)),
        }
    }

    /// Formats the features of one page
    pub fn format_page(&self, page: &PageFeatures) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(page, "page features"),
            OutputFormat::Yaml => to_yaml(page, "page features"),
            OutputFormat::Human => format_page_human(page),
        }
    }

    /// Formats configuration display
    pub fn format_config(&self, config: &HarvestConfig) -> Result<String> {
        let config_map: BTreeMap<String, String> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => to_json(&config_map, "config"),
            OutputFormat::Yaml => to_yaml(&config_map, "config"),
            OutputFormat::Human => Ok(format_config_human(&config_map)),
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

fn format_report_human(report: &HarvestReport) -> String {
    let mut output = String::new();

    if report.records > 0 {
        output.push_str("\u{2713} Harvest Complete\n");
    } else {
        output.push_str("\u{26A0} Harvest Complete (No Records)\n");
    }
    output.push_str(RULE);
    output.push_str("\n\n");

    output.push_str(&format!("Run:          {}\n", report.run_id));
    output.push_str(&format!("Date:         {}\n", report.date));
    output.push_str(&format!("Fetcher:      {}\n\n", report.fetcher));

    output.push_str("Feed:\n");
    output.push_str(&format!(
        "\u{251C}\u{2500} Entries:   {}\n",
        report.feed_entries
    ));
    output.push_str(&format!("\u{2514}\u{2500} Selected:  {}\n\n", report.selected));

    output.push_str("Captures:\n");
    output.push_str(&format!(
        "\u{251C}\u{2500} Fetched:   {}\n",
        report.captures.fetched_ok
    ));
    output.push_str(&format!(
        "\u{251C}\u{2500} Failed:    {}\n",
        report.captures.fetch_failed
    ));
    output.push_str(&format!(
        "\u{2514}\u{2500} Empty:     {}\n\n",
        report.captures.empty_documents
    ));

    output.push_str("Storage:\n");
    output.push_str(&format!("\u{251C}\u{2500} Records:   {}\n", report.records));
    output.push_str(&format!("\u{251C}\u{2500} Uploaded:  {}\n", report.uploaded));
    output.push_str(&format!(
        "\u{2514}\u{2500} Target:    {}\n\n",
        report.destination
    ));

    output.push_str(&format!(
        "Yield: {:.0}% of selected pages stored\n",
        report.yield_ratio() * 100.0
    ));
    if !report.features.is_empty() {
        output.push_str(&format!(
            "Features extracted for {} pages\n",
            report.features.len()
        ));
    }
    output.push_str(&format!("\nProcessed in {}ms\n", report.duration_ms));

    output
}

fn format_entries_human(entries: &[FeedEntry]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Selected Feed Entries ({})\n", entries.len()));
    output.push_str(RULE);
    output.push_str("\n\n");

    if entries.is_empty() {
        output.push_str("No verified, online entries for this day\n");
        return output;
    }

    for (i, entry) in entries.iter().enumerate() {
        output.push_str(&format!("{:>3}. {}\n", i + 1, entry.url));
        output.push_str(&format!(
            "     Target: {}  Verified: {}\n",
            entry.target, entry.verification_time
        ));
    }

    output
}

fn format_page_human(page: &PageFeatures) -> Result<String> {
    let mut output = String::new();

    output.push_str("Page Features\n");
    output.push_str(RULE);
    output.push_str("\n\n");
    output.push_str(&format!("URL: {}\n\n", page.url));

    // Flattened feature struct, keys sorted
    let features: BTreeMap<String, serde_json::Value> = serde_json::to_value(&page.features)
        .and_then(serde_json::from_value)
        .context("Failed to convert features for display")?;
    let width = features.keys().map(String::len).max().unwrap_or(0);
    for (name, value) in &features {
        output.push_str(&format!("  {:<width$}  {}\n", name, value, width = width));
    }

    output.push_str("\nVisible Text:\n");
    if page.visible_text.is_empty() {
        output.push_str("  (none)\n");
    } else {
        output.push_str(&format!("  {}\n", page.visible_text));
    }

    Ok(output)
}

fn format_config_human(config_map: &BTreeMap<String, String>) -> String {
    let mut output = String::new();

    output.push_str("phishharvest Configuration\n");
    output.push_str(RULE);
    output.push_str("\n\n");

    let section = |output: &mut String, title: &str, keys: &[(&str, &str, &str)]| {
        output.push_str(title);
        output.push('\n');
        for (key, label, unit) in keys {
            let value = config_map
                .get(*key)
                .map(String::as_str)
                .unwrap_or("(not set)");
            output.push_str(&format!("  {}: {}{}\n", label, value, unit));
        }
        output.push('\n');
    };

    section(
        &mut output,
        "Feed Configuration:",
        &[
            ("feed_url", "URL", ""),
            ("max_pages", "Max Pages", ""),
            ("request_timeout_secs", "Request Timeout", "s"),
        ],
    );
    section(
        &mut output,
        "Capture Configuration:",
        &[
            ("fetcher", "Fetcher", ""),
            ("concurrency", "Concurrency", ""),
            ("webdriver_url", "WebDriver URL", ""),
            ("page_timeout_secs", "Page Timeout", "s"),
            ("settle_ms", "Settle Delay", "ms"),
            ("max_page_kb", "Max Page Size", " KiB"),
        ],
    );
    section(
        &mut output,
        "Storage Configuration:",
        &[
            ("supabase_url", "Supabase URL", ""),
            ("supabase_key", "Supabase Key", ""),
            ("table", "Table", ""),
            ("upload_batch_size", "Batch Size", ""),
        ],
    );
    section(
        &mut output,
        "Logging:",
        &[("log_level", "Level", "")],
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{extract_features, ExtractOptions};
    use crate::fetch::FetcherKind;
    use crate::harvest::CaptureStats;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn create_test_report() -> HarvestReport {
        HarvestReport {
            run_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            fetcher: FetcherKind::Http,
            feed_entries: 1200,
            selected: 4,
            captures: CaptureStats {
                fetched_ok: 3,
                fetch_failed: 1,
                empty_documents: 1,
            },
            records: 2,
            uploaded: 2,
            destination: "daily_phish".to_string(),
            duration_ms: 1234,
            features: vec![],
        }
    }

    fn create_test_page() -> PageFeatures {
        let url = "http://secure-login.example.tk/verify";
        let html = "<html><body><form action='http://x.test/post'>\
                    <input type='password'></form><p>Sign in</p></body></html>";
        let (visible_text, features) =
            extract_features(url, Some(html), &ExtractOptions::default());
        PageFeatures {
            url: url.to_string(),
            visible_text,
            features,
        }
    }

    #[test]
    fn test_report_json_is_flat() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_report(&create_test_report()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["fetched_ok"], 3);
        assert_eq!(parsed["empty_documents"], 1);
        assert_eq!(parsed["fetcher"], "http");
        assert_eq!(parsed["date"], "2024-05-01");
        assert!(parsed.get("features").is_none());
    }

    #[test]
    fn test_report_yaml() {
        let formatter = OutputFormatter::new(OutputFormat::Yaml);
        let output = formatter.format_report(&create_test_report()).unwrap();

        let parsed: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed["uploaded"].as_u64(), Some(2));
    }

    #[test]
    fn test_report_human() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_report(&create_test_report()).unwrap();

        assert!(output.contains("Harvest Complete"));
        assert!(output.contains("2024-05-01"));
        assert!(output.contains("Selected:  4"));
        assert!(output.contains("Empty:     1"));
        assert!(output.contains("daily_phish"));
        assert!(output.contains("Yield: 50%"));
        assert!(output.contains("1234ms"));
    }

    #[test]
    fn test_entries_human() {
        let entries = vec![FeedEntry {
            url: "http://phish.test/login".to_string(),
            target: "PayPal".to_string(),
            verification_time: "2024-05-01T10:00:00+00:00".to_string(),
            ..Default::default()
        }];
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_entries(&entries).unwrap();

        assert!(output.contains("Selected Feed Entries (1)"));
        assert!(output.contains("  1. http://phish.test/login"));
        assert!(output.contains("PayPal"));

        let output = formatter.format_entries(&[]).unwrap();
        assert!(output.contains("No verified, online entries"));
    }

    #[test]
    fn test_page_json_has_flat_features() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_page(&create_test_page()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["features"]["num_password_inputs"], 1);
        assert_eq!(parsed["features"]["is_suspicious_tld"], true);
        assert_eq!(parsed["visible_text"], "sign in");
    }

    #[test]
    fn test_page_human() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_page(&create_test_page()).unwrap();

        assert!(output.contains("Page Features"));
        assert!(output.contains("num_password_inputs"));
        assert!(output.contains("suspicious_form_action"));
        assert!(output.contains("Visible Text:"));
        assert!(output.contains("sign in"));
    }

    #[test]
    fn test_config_human_masks_key() {
        let config = HarvestConfig {
            supabase_url: Some("https://abc.supabase.co".to_string()),
            supabase_key: Some("eyJhbGciOiJIUzI1NiJ9".to_string()),
            ..HarvestConfig::default()
        };
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_config(&config).unwrap();

        assert!(output.contains("Storage Configuration:"));
        assert!(output.contains("Supabase Key: eyJh****"));
        assert!(!output.contains("eyJhbGciOiJIUzI1NiJ9"));
    }

    #[test]
    fn test_config_json_sorted_keys() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_config(&HarvestConfig::default()).unwrap();

        let parsed: BTreeMap<String, String> = serde_json::from_str(&output).unwrap();
        assert!(parsed.contains_key("feed_url"));
        assert!(parsed.contains_key("table"));
    }
}
