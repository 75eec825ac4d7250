//! One-shot scrape probe: prints the normalized feeds as JSON
//! Run: cargo run --bin scrape-probe [-- --hltv-only]

use anyhow::{Context, Result};
use dotenv::dotenv;
use match_scraper::{HltvScraper, ScraperConfig, VlrScraper};
use tokio::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let hltv_only = std::env::args().any(|a| a == "--hltv-only");
    let config = ScraperConfig::from_env();

    info!("🔍 Scraping {}/matches ...", config.hltv_base_url);
    let started = Instant::now();
    let result = HltvScraper::new(config.clone())
        .scrape()
        .await
        .context("HLTV scrape failed")?;
    info!(
        "HLTV done in {}ms: {} live, {} upcoming",
        started.elapsed().as_millis(),
        result.live_matches.len(),
        result.upcoming_matches.len()
    );

    for m in &result.live_matches {
        info!(
            "LIVE {} vs {} [{}] {} -> {}",
            m.team1,
            m.team2,
            m.best_of,
            m.event,
            m.stream_url.as_deref().unwrap_or("-")
        );
    }
    println!("{}", serde_json::to_string_pretty(&result)?);

    if hltv_only {
        return Ok(());
    }

    info!("🔍 Scraping {}/ ...", config.vlr_base_url);
    let started = Instant::now();
    match VlrScraper::new(config)?.scrape_live().await {
        Ok(feed) => {
            info!("VLR done in {}ms: {} live", started.elapsed().as_millis(), feed.count);
            println!("{}", serde_json::to_string_pretty(&feed)?);
        }
        Err(e) => warn!("❌ VLR scrape failed: {}", e),
    }

    Ok(())
}
