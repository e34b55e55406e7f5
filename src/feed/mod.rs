//! PhishTank feed download and selection
//!
//! The feed is a single JSON array of every phish PhishTank currently lists
//! as online and verified. A run only cares about entries verified on one
//! UTC day, so selection happens client-side.

pub mod client;
pub mod filter;
pub mod types;

pub use client::{FeedClient, FeedError};
pub use filter::{default_target_date, FeedFilter};
pub use types::FeedEntry;
