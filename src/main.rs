use anyhow::Context;
use clap::Parser;
use juistebod_scraper::{ListingScraper, ScrapeConfig, ScrapeOptions, ScrapeOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Scrape property listings into JSON outcomes
#[derive(Debug, Parser)]
#[command(name = "juistebod-scraper", version)]
struct Cli {
    /// Listing URLs to scrape, one after another
    #[arg(required = true)]
    urls: Vec<String>,

    /// JSON config file (defaults to juistebod.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    timeout_ms: Option<u64>,

    #[arg(long)]
    max_attempts: Option<u32>,

    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Also write all outcomes as a JSON array to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> ScrapeOptions {
        ScrapeOptions {
            timeout: self.timeout_ms.map(Duration::from_millis),
            max_attempts: self.max_attempts,
            retry_delay: self.retry_delay_ms.map(Duration::from_millis),
            request_id: None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let config = ScrapeConfig::load(cli.config.as_deref())?;
    let scraper = ListingScraper::new(config).context("failed to build scraper")?;

    info!("🏠 JuisteBod listing scraper: {} URL(s)", cli.urls.len());

    let mut outcomes: Vec<ScrapeOutcome> = Vec::with_capacity(cli.urls.len());
    for url in &cli.urls {
        let outcome = scraper.scrape_listing(url, cli.options()).await;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        outcomes.push(outcome);
    }

    let failed = outcomes.iter().filter(|o| !o.success).count();
    info!("✅ {} succeeded, {} failed", outcomes.len() - failed, failed);

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&outcomes)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!("💾 Saved outcomes to {}", path.display());
    }

    if failed > 0 {
        error!("{} scrape(s) failed", failed);
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
