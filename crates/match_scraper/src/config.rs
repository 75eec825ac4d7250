use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HLTV_BASE_URL: &str = "https://www.hltv.org";
pub const DEFAULT_VLR_BASE_URL: &str = "https://www.vlr.gg";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Everything the scrapers need to reach the source sites.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub hltv_base_url: String,
    pub vlr_base_url: String,
    pub user_agent: String,
    /// Navigation budget for one page load.
    pub render_timeout: Duration,
    /// How long the renderer waits for the expected selector.
    pub wait_timeout: Duration,
    pub http_timeout: Duration,
    /// `http://[user:pass@]host:port`, applied to both HTTP and browser traffic.
    pub proxy: Option<String>,
    pub chrome_path: Option<PathBuf>,
    pub enrich_live_details: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            hltv_base_url: DEFAULT_HLTV_BASE_URL.to_string(),
            vlr_base_url: DEFAULT_VLR_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            render_timeout: Duration::from_secs(30),
            wait_timeout: Duration::from_secs(15),
            http_timeout: Duration::from_secs(10),
            proxy: None,
            chrome_path: None,
            enrich_live_details: true,
        }
    }
}

impl ScraperConfig {
    /// Reads overrides from the environment; anything unset or unparsable
    /// keeps its default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            hltv_base_url: env_string("HLTV_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.hltv_base_url),
            vlr_base_url: env_string("VLR_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.vlr_base_url),
            user_agent: env_string("SCRAPER_USER_AGENT").unwrap_or(defaults.user_agent),
            render_timeout: env_secs("RENDER_TIMEOUT_SECS").unwrap_or(defaults.render_timeout),
            wait_timeout: env_secs("WAIT_FOR_TIMEOUT_SECS").unwrap_or(defaults.wait_timeout),
            http_timeout: env_secs("HTTP_TIMEOUT_SECS").unwrap_or(defaults.http_timeout),
            proxy: env_string("SCRAPER_PROXY"),
            chrome_path: env_string("CHROME_PATH").map(PathBuf::from),
            enrich_live_details: env_string("ENRICH_LIVE_DETAILS")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.enrich_live_details),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_string(key)
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
