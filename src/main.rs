use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_scraper::{config::Config, runner};

#[derive(Parser)]
#[command(name = "m3u-scraper")]
#[command(version = "0.1.0")]
#[command(about = "Regional live-TV catalog scraper emitting per-region M3U and JSON artifacts")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Output directory (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = format!("m3u_scraper={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting M3U Scraper v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());

    // Override config with CLI arguments
    if let Some(output_dir) = cli.output_dir {
        config.output.dir = output_dir;
    }

    let stats = runner::run(&config).await?;
    info!(
        "Collected {} channels across {} regions",
        stats.total_channels, stats.regions_with_data
    );

    Ok(())
}
