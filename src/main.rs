use phishharvest::cli::commands::{CliArgs, Commands};
use phishharvest::cli::handlers::{handle_config, handle_extract, handle_feed, handle_harvest};
use phishharvest::util::logging::{init_logging, parse_level, LoggingConfig};
use phishharvest::{NAME, VERSION};

use clap::Parser;
use std::env;
use std::process;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Harvest(harvest_args) => handle_harvest(harvest_args, args.quiet).await,
        Commands::Feed(feed_args) => handle_feed(feed_args).await,
        Commands::Extract(extract_args) => handle_extract(extract_args).await,
        Commands::Config(config_args) => handle_config(config_args),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("PHISHHARVEST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    init_logging(LoggingConfig::with_level(level).json_from_env());
}
