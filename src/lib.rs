//! phishharvest - daily harvester for verified phishing pages
//!
//! The harvest downloads the PhishTank feed, keeps the entries verified on
//! the target day that are still online, captures their HTML with a headless
//! browser (or plain HTTP) and stores the non-empty pages in a Supabase table.
//! Pages can also be reduced to URL and DOM heuristics plus normalized visible
//! text for downstream classifiers.
//!
//! # Example
//!
//! ```
//! use phishharvest::{extract_features, ExtractOptions};
//!
//! let html = "<html><body><form action='https://collector.test/p'>\
//!             <input type='password'></form></body></html>";
//! let (_text, features) =
//!     extract_features("http://login-verify.example.tk/", Some(html), &ExtractOptions::default());
//!
//! assert_eq!(features.dom.num_password_inputs, 1);
//! assert!(features.dom.suspicious_form_action);
//! assert!(features.url.is_suspicious_tld);
//! ```
//!
//! # Project Structure
//!
//! - [`feed`]: feed download and day selection
//! - [`fetch`]: browser and HTTP page capture
//! - [`features`]: URL, DOM and visible-text heuristics
//! - [`store`]: Supabase and JSON-lines sinks
//! - [`harvest`]: the end-to-end daily run

pub mod cli;
pub mod config;
pub mod features;
pub mod feed;
pub mod fetch;
pub mod harvest;
pub mod progress;
pub mod store;
pub mod util;

pub use config::{ConfigError, HarvestConfig};
pub use features::{extract_features, ExtractOptions, PhishFeatures};
pub use feed::{FeedClient, FeedEntry, FeedError, FeedFilter};
pub use fetch::{BrowserFetcher, FetchStatus, FetcherKind, HttpFetcher, PageFetcher};
pub use harvest::{HarvestError, HarvestOptions, HarvestReport, Harvester};
pub use store::{JsonLinesSink, PhishRecord, RecordSink, StoreError, SupabaseSink};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
