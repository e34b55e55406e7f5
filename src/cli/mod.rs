pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, ConfigArgs, ExtractArgs, FeedArgs, HarvestArgs};
pub use output::{OutputFormat, OutputFormatter};
