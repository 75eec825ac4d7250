use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use match_scraper::ScraperConfig;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub log_dir: PathBuf,
    pub scraper: ScraperConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().context("Invalid PORT")?,
            Err(_) => 3000,
        };
        let cache_ttl = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        let log_dir = env::var("FEED_LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        Ok(Self {
            host,
            port,
            cache_ttl: Duration::from_secs(cache_ttl),
            log_dir: PathBuf::from(log_dir),
            scraper: ScraperConfig::from_env(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
