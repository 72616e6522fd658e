use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webcam_scraper::config::Config;
use webcam_scraper::runner::Runner;
use webcam_scraper::scraper::{Scraper, ScraperConfig};
use webcam_scraper::wsdot::WsdotCameras;

#[derive(Parser)]
#[command(
    name = "webcam-scraper",
    about = "Periodically collects webcam stills into canonical PNG files",
    version
)]
struct Cli {
    /// Run a single pass and exit instead of scheduling.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // JSON logs to stdout; LOG_LEVEL holds a tracing filter directive.
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("error")))
        .init();

    let config = Config::from_env().context("could not load configuration")?;

    let cameras = config
        .wsdot_api_key
        .as_deref()
        .map(|key| WsdotCameras::new(key, &config.user_agent));
    if cameras.is_none() {
        info!("no WSDOT API key configured, api-mode sources will be skipped");
    }

    let scraper = Arc::new(Scraper::new(
        ScraperConfig {
            user_agent: config.user_agent,
            sources: config.sources,
            output_dir: config.output_dir,
        },
        cameras,
    ));

    if cli.once {
        scraper.run_pass().await;
        return Ok(());
    }

    let runner = Runner::new(scraper, &config.cron_schedule)
        .context("could not build schedule from CRON_SCHEDULE")?;

    info!(version = env!("CARGO_PKG_VERSION"), "webcam-scraper is running");
    runner.run().await;
    info!("webcam-scraper is shutting down");

    Ok(())
}
