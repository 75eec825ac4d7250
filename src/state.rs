use anyhow::{Context, Result};
use logger::EventLogger;
use match_scraper::{HltvScraper, ScrapeResult, VlrFeed, VlrScraper};

use crate::cache::TtlCache;
use crate::config::ServerConfig;

pub struct AppState {
    pub hltv: HltvScraper,
    pub vlr: VlrScraper,
    pub hltv_cache: TtlCache<ScrapeResult>,
    pub vlr_cache: TtlCache<VlrFeed>,
    pub events: EventLogger,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            hltv: HltvScraper::new(config.scraper.clone()),
            vlr: VlrScraper::new(config.scraper.clone()).context("Failed to build VLR client")?,
            hltv_cache: TtlCache::new(config.cache_ttl),
            vlr_cache: TtlCache::new(config.cache_ttl),
            events: EventLogger::new(config.log_dir.clone()),
        })
    }
}
