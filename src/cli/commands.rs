use crate::fetch::FetcherKind;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Daily harvester for verified phishing pages
#[derive(Parser, Debug)]
#[command(
    name = "phishharvest",
    about = "Daily harvester for verified phishing pages",
    version,
    author,
    long_about = "phishharvest downloads the PhishTank feed, captures the pages verified \
                  and still online on a given day, and stores their HTML in a Supabase \
                  table. It can also extract URL and DOM heuristics from single pages."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the daily harvest",
        long_about = "Selects yesterday's verified, online feed entries, captures their \
                      pages and uploads the non-empty ones.\n\n\
                      Examples:\n  \
                      phishharvest harvest\n  \
                      phishharvest harvest --date 2024-05-01 --limit 20\n  \
                      phishharvest harvest --fetcher http --dry-run --output records.jsonl\n  \
                      phishharvest harvest --dry-run --features-out features.jsonl --format json"
    )]
    Harvest(HarvestArgs),

    #[command(
        about = "List selected feed entries",
        long_about = "Downloads the feed and prints the entries a harvest would capture.\n\n\
                      Examples:\n  \
                      phishharvest feed\n  \
                      phishharvest feed --date 2024-05-01 --format json"
    )]
    Feed(FeedArgs),

    #[command(
        about = "Extract features from one page",
        long_about = "Captures a page (or reads it from a file) and prints its URL and DOM \
                      features together with the normalized visible text.\n\n\
                      Examples:\n  \
                      phishharvest extract http://login.example.test/verify\n  \
                      phishharvest extract http://login.example.test --html-file page.html\n  \
                      phishharvest extract http://login.example.test --fetcher http --format json"
    )]
    Extract(ExtractArgs),

    #[command(
        about = "Show effective configuration",
        long_about = "Prints the configuration loaded from the environment. The Supabase \
                      key is masked.\n\n\
                      Examples:\n  \
                      phishharvest config\n  \
                      phishharvest config --format yaml"
    )]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct HarvestArgs {
    #[arg(
        long,
        value_name = "YYYY-MM-DD",
        value_parser = parse_date,
        help = "Verification day to harvest (defaults to yesterday, UTC)"
    )]
    pub date: Option<NaiveDate>,

    #[arg(
        short = 'n',
        long,
        value_name = "N",
        help = "Maximum number of pages to capture"
    )]
    pub limit: Option<usize>,

    #[arg(long, value_parser = parse_fetcher, help = "Capture backend: browser or http")]
    pub fetcher: Option<FetcherKind>,

    #[arg(long, value_name = "N", help = "Pages captured in parallel")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Write records as JSON lines instead of uploading")]
    pub dry_run: bool,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        requires = "dry_run",
        help = "Dry-run output file (defaults to stdout)"
    )]
    pub output: Option<PathBuf>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Write page features as JSON lines to FILE"
    )]
    pub features_out: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Report format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct FeedArgs {
    #[arg(
        long,
        value_name = "YYYY-MM-DD",
        value_parser = parse_date,
        help = "Verification day (defaults to yesterday, UTC)"
    )]
    pub date: Option<NaiveDate>,

    #[arg(short = 'n', long, value_name = "N", help = "Maximum number of entries")]
    pub limit: Option<usize>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(value_name = "URL", help = "Page URL")]
    pub url: String,

    #[arg(
        long,
        value_name = "FILE",
        help = "Read HTML from FILE instead of capturing the page"
    )]
    pub html_file: Option<PathBuf>,

    #[arg(long, value_parser = parse_fetcher, help = "Capture backend: browser or http")]
    pub fetcher: Option<FetcherKind>,

    #[arg(
        long,
        value_name = "N",
        default_value = "512",
        help = "Maximum number of visible-text tokens"
    )]
    pub max_tokens: usize,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}. Expected YYYY-MM-DD", s, e))
}

fn parse_fetcher(s: &str) -> Result<FetcherKind, String> {
    s.parse()
}
