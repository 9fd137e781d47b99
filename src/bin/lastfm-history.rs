mod commands;

use clap::Parser;
use commands::{execute_command, Commands};

/// Last.fm listening history downloader
#[derive(Parser)]
#[command(
    name = "lastfm-history",
    about = "Download Last.fm listening history as raw JSON pages",
    long_about = None
)]
struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG overrides it
    #[arg(long, global = true, default_value = "info")]
    log_level: log::LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    if let Err(e) = execute_command(args.command).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
